mod async_repository_test;
mod concurrency_test;
mod filter_composer_test;
mod repository_factory_test;
mod repository_test;

use chrono::{DateTime, Utc};
use docrepo::collection::ObjectId;
use docrepo_derive::{Convertible, Entity};
use fake::faker::address::en::CityName;
use fake::faker::chrono::en::DateTime as FakeDateTime;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::{rng, Rng};

#[derive(Debug, Convertible, Entity, Default, Clone, PartialEq)]
pub struct TestEntity {
    pub id: ObjectId,
    pub name: String,
    pub int_field: i32,
}

impl TestEntity {
    pub fn new(name: &str, int_field: i32) -> Self {
        TestEntity {
            name: name.to_string(),
            int_field,
            ..Default::default()
        }
    }
}

#[derive(Debug, Convertible, Entity, Default, Clone, PartialEq)]
pub struct Person {
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub city: Option<String>,
    pub age: i32,
    pub born: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

#[derive(Debug, Convertible, Entity, Default, Clone, PartialEq)]
#[entity(collection = "audit_log", id(field = "entry_id"))]
#[converter(ignored = "scratch")]
pub struct AuditEntry {
    pub entry_id: ObjectId,
    pub action: String,
    pub scratch: String,
}

pub fn generate_person() -> Person {
    Person {
        id: ObjectId::EMPTY,
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        city: Some(CityName().fake()),
        age: rng().random_range(18..90),
        born: Some(FakeDateTime().fake()),
        tags: vec!["generated".to_string()],
    }
}

pub fn generate_people(count: usize) -> Vec<Person> {
    (0..count).map(|_| generate_person()).collect()
}
