use crate::store::NamespaceRecord;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kubernetes_namespaces")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Kubernetes uid, NULL for namespaces created in the portal
    pub uid: Option<String>,
    pub visible: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_account::Entity")]
    ServiceAccounts,
}

impl Related<super::service_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for NamespaceRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            uid: model.uid,
            visible: model.visible,
        }
    }
}
