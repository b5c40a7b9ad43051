use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string(Movies::Title))
                    .col(integer(Movies::YearOfRelease))
                    .col(integer(Movies::RunningTime))
                    .col(string(Movies::Genre))
                    .to_owned(),
            )
            .await?;

        // No unique index on (user_id, movie_id): uniqueness is checked by the
        // rating upsert before inserting.
        manager
            .create_table(
                Table::create()
                    .table(MovieRatings::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieRatings::Id))
                    .col(integer(MovieRatings::UserId))
                    .col(integer(MovieRatings::MovieId))
                    .col(integer(MovieRatings::Rating))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_ratings_user_id")
                            .from(MovieRatings::Table, MovieRatings::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_ratings_movie_id")
                            .from(MovieRatings::Table, MovieRatings::MovieId)
                            .to(Movies::Table, Movies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_ratings_user_id")
                    .table(MovieRatings::Table)
                    .col(MovieRatings::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_ratings_movie_id")
                    .table(MovieRatings::Table)
                    .col(MovieRatings::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MovieRatings::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    YearOfRelease,
    RunningTime,
    Genre,
}

#[derive(DeriveIden)]
enum MovieRatings {
    Table,
    Id,
    UserId,
    MovieId,
    Rating,
}
