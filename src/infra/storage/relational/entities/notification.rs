use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Notification, NotificationKind};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Notification {
    fn from(model: Model) -> Self {
        Notification {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            message: model.message,
            kind: NotificationKind::from(model.kind.as_str()),
            is_read: model.is_read,
            created_at: model.created_at,
        }
    }
}

impl From<Notification> for ActiveModel {
    fn from(notification: Notification) -> Self {
        ActiveModel {
            id: Set(notification.id),
            user_id: Set(notification.user_id),
            title: Set(notification.title),
            message: Set(notification.message),
            kind: Set(notification.kind.as_str().to_string()),
            is_read: Set(notification.is_read),
            created_at: Set(notification.created_at),
        }
    }
}
