use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::Project;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub client_id: Option<String>,
    pub color: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub budget: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub hourly_rate: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "SetNull"
    )]
    Client,
    #[sea_orm(has_many = "super::time_entry::Entity")]
    TimeEntries,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::time_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Project {
    fn from(model: Model) -> Self {
        Project {
            id: model.id,
            name: model.name,
            description: model.description,
            client_id: model.client_id,
            color: model.color,
            budget: model.budget,
            hourly_rate: model.hourly_rate,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Project> for ActiveModel {
    fn from(project: Project) -> Self {
        ActiveModel {
            id: Set(project.id),
            name: Set(project.name),
            description: Set(project.description),
            client_id: Set(project.client_id),
            color: Set(project.color),
            budget: Set(project.budget),
            hourly_rate: Set(project.hourly_rate),
            is_active: Set(project.is_active),
            created_at: Set(project.created_at),
            updated_at: Set(project.updated_at),
        }
    }
}
