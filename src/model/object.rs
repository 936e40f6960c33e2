//! Object types.

use serde::Serialize;

use idoit_protocol::{IdoitObject, ObjectId};

use super::category::{CategoryAccounting, CategoryContactAssignment, CategoryGlobal, ClientCategory};

/// A client workstation (`C__OBJTYPE__CLIENT`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<CategoryGlobal>,
    pub contacts: Vec<CategoryContactAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounting: Option<CategoryAccounting>,
}

impl IdoitObject for Client {
    type Category = ClientCategory;

    const TYPE_NAME: &'static str = "C__OBJTYPE__CLIENT";
    const CATEGORIES: &'static [&'static str] = &[
        CategoryGlobal::CLASS,
        CategoryContactAssignment::CLASS,
        CategoryAccounting::CLASS,
    ];

    fn with_id(id: ObjectId) -> Self {
        Self {
            id,
            global: None,
            contacts: Vec::new(),
            accounting: None,
        }
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn set_category(&mut self, category: ClientCategory) {
        match category {
            ClientCategory::Global(global) => self.global = Some(global),
            ClientCategory::Contact(contact) => self.contacts.push(contact),
            ClientCategory::Accounting(accounting) => self.accounting = Some(accounting),
        }
    }
}

/// A physical server (`C__OBJTYPE__SERVER`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<CategoryGlobal>,
}

impl IdoitObject for Server {
    type Category = CategoryGlobal;

    const TYPE_NAME: &'static str = "C__OBJTYPE__SERVER";
    const CATEGORIES: &'static [&'static str] = &[CategoryGlobal::CLASS];

    fn with_id(id: ObjectId) -> Self {
        Self {
            id,
            title: None,
            global: None,
        }
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn set_category(&mut self, global: CategoryGlobal) {
        self.title = Some(global.title.clone());
        self.global = Some(global);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(obj_id: i64, title: &str) -> CategoryGlobal {
        CategoryGlobal {
            id: None,
            obj_id: ObjectId(obj_id),
            title: title.to_string(),
            sysid: None,
            purpose: None,
            cmdb_status: None,
            object_type: None,
            description: None,
            created: None,
            changed: None,
        }
    }

    #[test]
    fn test_client_collects_contacts() {
        let mut client = Client::with_id(ObjectId(5));
        for contact in [17, 18] {
            client.set_category(ClientCategory::Contact(CategoryContactAssignment {
                id: None,
                obj_id: ObjectId(5),
                contact: ObjectId(contact),
                role: None,
                primary: None,
            }));
        }
        client.set_category(ClientCategory::Global(global(5, "ws-005")));

        assert_eq!(client.contacts.len(), 2);
        assert_eq!(client.global.unwrap().title, "ws-005");
    }

    #[test]
    fn test_server_takes_title_from_global() {
        let mut server = Server::with_id(ObjectId(9));
        server.set_category(global(9, "db-01"));

        assert_eq!(server.title.as_deref(), Some("db-01"));
        assert_eq!(Server::CATEGORIES, &["C__CATG__GLOBAL"]);
    }
}
