use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;

pub const ADDRESS_MAX_LEN: usize = 255;
pub const PHONE_NUMBER_MAX_LEN: usize = 15;

/// Customer profile. One-to-one with a user; the user's id is the primary key,
/// so a user can own at most one customer row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Deleted together with its owner.
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

fn check_len(field: &str, value: &ActiveValue<Option<String>>, max: usize) -> Result<(), DbErr> {
    if let ActiveValue::Set(Some(text)) | ActiveValue::Unchanged(Some(text)) = value {
        if text.chars().count() > max {
            return Err(DbErr::Custom(format!(
                "{field} must be at most {max} characters"
            )));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        check_len("address", &self.address, ADDRESS_MAX_LEN)?;
        check_len("phone_number", &self.phone_number, PHONE_NUMBER_MAX_LEN)?;
        Ok(self)
    }
}
