use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Iterable};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Ratings are whole stars between 0 and 5 inclusive.
pub const RATING_RANGE: RangeInclusive<i32> = 0..=5;

/// The trade a company offers. Stored as its human readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(70))")]
pub enum ServiceCategory {
    #[sea_orm(string_value = "Air Conditioner")]
    AirConditioner,
    #[sea_orm(string_value = "All in One")]
    AllInOne,
    #[sea_orm(string_value = "Carpentry")]
    Carpentry,
    #[sea_orm(string_value = "Electricity")]
    Electricity,
    #[sea_orm(string_value = "Gardening")]
    Gardening,
    #[sea_orm(string_value = "Home Machines")]
    HomeMachines,
    #[sea_orm(string_value = "House Keeping")]
    HouseKeeping,
    #[sea_orm(string_value = "Interior Design")]
    InteriorDesign,
    #[sea_orm(string_value = "Locks")]
    Locks,
    #[sea_orm(string_value = "Painting")]
    Painting,
    #[sea_orm(string_value = "Plumbing")]
    Plumbing,
    #[sea_orm(string_value = "Water Heaters")]
    WaterHeaters,
}

impl ServiceCategory {
    pub fn label(&self) -> String {
        self.to_value()
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for ServiceCategory {
    type Err = String;

    /// Accepts the stored label ("Water Heaters"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::iter()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("'{}' is not a known service category", s))
    }
}

/// Company profile. One-to-one with a user, keyed by the user's id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    pub field: ServiceCategory,
    #[sea_orm(default_value = 0)]
    pub rating: i32,
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

/// Rejects ratings outside [`RATING_RANGE`].
pub fn validate_rating(rating: i32) -> Result<(), DbErr> {
    if RATING_RANGE.contains(&rating) {
        Ok(())
    } else {
        Err(DbErr::Custom(format!(
            "rating must be between {} and {}, got {}",
            RATING_RANGE.start(),
            RATING_RANGE.end(),
            rating
        )))
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let ActiveValue::Set(rating) | ActiveValue::Unchanged(rating) = &self.rating {
            validate_rating(*rating)?;
        }
        Ok(self)
    }
}
