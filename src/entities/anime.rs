use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "anime")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub mal_id: Option<i32>,
    pub title: String,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub cover_image: Option<String>,
    pub trailer_url: Option<String>,
    /// One of `G`, `PG`, `PG-13`, `R`, `R+`, `Rx`.
    pub age_rating: String,
    /// One of `ONGOING`, `COMPLETED`, `UPCOMING`.
    pub status: String,
    pub release_date: Option<String>,
    pub end_date: Option<String>,
    pub score: Option<f32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::season::Entity")]
    Season,
}

impl Related<super::season::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Season.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
