use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub year_of_release: i32,
    /// Minutes.
    pub running_time: i32,
    pub genre: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movie_rating::Entity")]
    MovieRating,
}

impl Related<super::movie_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieRating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
