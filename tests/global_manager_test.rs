//! 全局连接管理器和自定义命名变换器测试

use rat_quickrecord::*;
use serde_json::json;
use std::sync::Arc;

struct Person;

impl Model for Person {
    fn meta() -> ModelMeta {
        ModelMeta::new().field("name", "string")
    }
}

/// 集合名不做复数化
struct Singular;

impl Inflector for Singular {
    fn to_snake_case(&self, name: &str) -> String {
        DefaultInflector.to_snake_case(name)
    }

    fn tableize(&self, name: &str) -> String {
        self.to_snake_case(name)
    }
}

#[test]
fn test_global_connection_manager() {
    assert!(matches!(
        ModelManager::<Person>::from_global(),
        Err(QuickRecordError::ConfigError { .. })
    ));

    let driver = MemoryDriver::new();
    let config = StoreConfig::builder()
        .host("localhost:27017")
        .database("global")
        .find_timeout_ms(1000)
        .build()
        .unwrap();
    let connections = Arc::new(ConnectionManager::new(Arc::new(driver.clone()), config));
    set_global_connection_manager(connections.clone()).unwrap();
    assert!(set_global_connection_manager(connections.clone()).is_err());

    let people = ModelManager::<Person>::from_global().unwrap();
    assert_eq!(people.collection_name(), "people");
    assert_eq!(people.find_timeout(), 1000);

    tokio_test::block_on(async {
        let mut person = people.new_record(document_from_json(json!({"name": "ann"})).unwrap());
        assert!(person.save(&WriteOptions::default()).await.unwrap());
        assert_eq!(people.count(&Filter::new()).await.unwrap(), 1);
    });
    println!("✅ 全局管理器保存成功: {:?}", driver.documents("global", "people"));

    let singular = ModelManager::<Person>::with_inflector(connections, Arc::new(Singular));
    assert_eq!(singular.collection_name(), "person");
}
