use sea_orm::entity::prelude::*;

/// Represents an account holder of the system.
/// The identity record every role record (customer, company) hangs off.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Unique across all users. At most 100 characters.
    #[sea_orm(unique)]
    pub email: String,
    /// PHC-formatted password hash. Never the raw password.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(default_value = "false")]
    pub is_company: bool,
    #[sea_orm(default_value = "false")]
    pub is_customer: bool,
    /// Inactive accounts cannot log in.
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    #[sea_orm(default_value = "false")]
    pub is_staff: bool,
    #[sea_orm(default_value = "false")]
    pub is_superuser: bool,
    pub date_joined: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user has at most one customer profile.
    #[sea_orm(has_one = "super::customer::Entity")]
    Customer,
    /// A user has at most one company profile.
    #[sea_orm(has_one = "super::company::Entity")]
    Company,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
