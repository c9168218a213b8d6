use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{TimeOffRequest, TimeOffStatus, TimeOffType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "time_off_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub status: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TimeOffRequest {
    fn from(model: Model) -> Self {
        TimeOffRequest {
            id: model.id,
            user_id: model.user_id,
            kind: TimeOffType::from(model.kind.as_str()),
            start_date: model.start_date,
            end_date: model.end_date,
            reason: model.reason,
            status: TimeOffStatus::from(model.status.as_str()),
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<TimeOffRequest> for ActiveModel {
    fn from(request: TimeOffRequest) -> Self {
        ActiveModel {
            id: Set(request.id),
            user_id: Set(request.user_id),
            kind: Set(request.kind.as_str().to_string()),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            reason: Set(request.reason),
            status: Set(request.status.as_str().to_string()),
            approved_by: Set(request.approved_by),
            approved_at: Set(request.approved_at),
            created_at: Set(request.created_at),
            updated_at: Set(request.updated_at),
        }
    }
}
