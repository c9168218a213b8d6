//! Time entry entity. `status` holds the lowercase workflow state.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{TimeEntry, TimeEntryStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "time_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub start_time: Option<DateTimeUtc>,
    pub end_time: Option<DateTimeUtc>,
    pub duration: Option<i32>,
    pub date: DateTimeUtc,
    pub is_billable: bool,
    pub status: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TimeEntry {
    fn from(model: Model) -> Self {
        TimeEntry {
            id: model.id,
            user_id: model.user_id,
            project_id: model.project_id,
            description: model.description,
            start_time: model.start_time,
            end_time: model.end_time,
            duration: model.duration,
            date: model.date,
            is_billable: model.is_billable,
            status: TimeEntryStatus::from(model.status.as_str()),
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<TimeEntry> for ActiveModel {
    fn from(entry: TimeEntry) -> Self {
        ActiveModel {
            id: Set(entry.id),
            user_id: Set(entry.user_id),
            project_id: Set(entry.project_id),
            description: Set(entry.description),
            start_time: Set(entry.start_time),
            end_time: Set(entry.end_time),
            duration: Set(entry.duration),
            date: Set(entry.date),
            is_billable: Set(entry.is_billable),
            status: Set(entry.status.as_str().to_string()),
            approved_by: Set(entry.approved_by),
            approved_at: Set(entry.approved_at),
            created_at: Set(entry.created_at),
            updated_at: Set(entry.updated_at),
        }
    }
}
