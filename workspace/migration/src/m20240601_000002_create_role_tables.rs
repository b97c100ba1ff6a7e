use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{company, customer, user};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create customers table, keyed by the owning user
        manager
            .create_table(
                Table::create()
                    .table(Customer::table())
                    .if_not_exists()
                    .col(
                        integer(Customer::column(customer::Column::UserId)).primary_key(),
                    )
                    .col(string_len_null(
                        Customer::column(customer::Column::Address),
                        customer::ADDRESS_MAX_LEN as u32,
                    ))
                    .col(string_len_null(
                        Customer::column(customer::Column::PhoneNumber),
                        customer::PHONE_NUMBER_MAX_LEN as u32,
                    ))
                    .col(date_null(Customer::column(customer::Column::DateOfBirth)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_user")
                            .from(
                                Customer::table(),
                                Customer::column(customer::Column::UserId),
                            )
                            .to(User::table(), User::column(user::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create companies table, keyed by the owning user
        let rating = Company::column(company::Column::Rating);
        manager
            .create_table(
                Table::create()
                    .table(Company::table())
                    .if_not_exists()
                    .col(
                        integer(Company::column(company::Column::UserId)).primary_key(),
                    )
                    .col(string_len(Company::column(company::Column::Field), 70))
                    .col(
                        integer(rating.clone())
                            .default(0)
                            .check(Expr::col(rating).between(
                                *company::RATING_RANGE.start(),
                                *company::RATING_RANGE.end(),
                            )),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_companies_user")
                            .from(
                                Company::table(),
                                Company::column(company::Column::UserId),
                            )
                            .to(User::table(), User::column(user::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Company::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customer::table()).to_owned())
            .await?;

        Ok(())
    }
}
