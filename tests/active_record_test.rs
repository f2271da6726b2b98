//! Active Record 生命周期集成测试（内存驱动）

use rat_quickrecord::*;
use serde_json::json;
use std::sync::Arc;

struct User;

impl Model for User {
    fn meta() -> ModelMeta {
        ModelMeta::new()
            .field("name", "string")
            .field("age", "integer")
            .field("score", "float")
            .field("tags", "array")
            .field("born", date_field())
            .index(IndexDefinition::new(IndexKeys::new().asc("name")).unique())
    }

    fn validators() -> Vec<FieldValidator> {
        vec![
            FieldValidator::new("Name", |value| value.as_str().is_some_and(|name| !name.is_empty())),
            FieldValidator::new("Age", |value| value.as_i64().is_some_and(|age| age >= 0)),
        ]
    }
}

/// 用 trail 数组记录钩子的调用顺序
struct Post;

fn push_trail(record: &mut ActiveRecord<Post>, step: &str) {
    let mut trail = record.get("trail").as_array().cloned().unwrap_or_default();
    trail.push(DataValue::from(step));
    record.set("trail", trail);
}

impl Model for Post {
    fn meta() -> ModelMeta {
        ModelMeta::new().field("title", "string").field("trail", "array")
    }

    fn validators() -> Vec<FieldValidator> {
        vec![FieldValidator::new("Title", |value| value.as_str().is_some_and(|t| !t.is_empty()))]
    }

    fn after_new(record: &mut ActiveRecord<Self>) {
        push_trail(record, "after_new");
    }

    fn before_validation(record: &mut ActiveRecord<Self>) {
        push_trail(record, "before_validation");
    }

    fn after_validation(record: &mut ActiveRecord<Self>) {
        push_trail(record, "after_validation");
    }

    fn before_save(record: &mut ActiveRecord<Self>) {
        push_trail(record, "before_save");
    }

    fn after_save(record: &mut ActiveRecord<Self>) {
        push_trail(record, "after_save");
    }

    fn before_destroy(record: &mut ActiveRecord<Self>) {
        push_trail(record, "before_destroy");
    }
}

struct BlogPost;

impl Model for BlogPost {
    fn meta() -> ModelMeta {
        ModelMeta::new().field("title", "string")
    }
}

fn config() -> StoreConfig {
    StoreConfig::builder()
        .host("localhost:27017")
        .database("test")
        .find_timeout_ms(20000)
        .build()
        .unwrap()
}

fn setup() -> (MemoryDriver, Arc<ConnectionManager>) {
    let driver = MemoryDriver::new();
    let connections = Arc::new(ConnectionManager::new(Arc::new(driver.clone()), config()));
    (driver, connections)
}

fn row(value: serde_json::Value) -> Document {
    document_from_json(value).unwrap()
}

fn trail(record: &Document) -> Vec<String> {
    record["trail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|step| step.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_id_key_is_renamed() {
    let (_, connections) = setup();
    let users = ModelManager::<User>::new(connections);

    let record = users.new_record(row(json!({"id": "x", "name": "ann"})));
    assert_eq!(record.id(), Some(&DataValue::from("x")));
    assert!(!record.attributes().contains_key("id"));

    let mut record = users.new_record(Document::new());
    record.set("id", "y");
    assert_eq!(record.get("_id"), DataValue::from("y"));
    assert!(!record.attributes().contains_key("id"));
}

#[tokio::test]
async fn test_save_coerces_and_flips_new_flag() {
    let (driver, connections) = setup();
    let users = ModelManager::<User>::new(connections);

    let mut record = users.new_record(row(json!({
        "name": "ann",
        "age": "42",
        "score": "3.5",
        "tags": "rust",
        "born": "2024-01-15",
        "nickname": "7",
    })));
    assert!(record.is_new());

    assert!(record.save(&WriteOptions::default()).await.unwrap());
    assert!(!record.is_new());
    assert!(matches!(record.id(), Some(DataValue::ObjectId(_))));

    let stored = driver.documents("test", "users");
    assert_eq!(stored.len(), 1);
    let stored = &stored[0];
    assert_eq!(stored["age"], DataValue::Int(42));
    assert_eq!(stored["score"], DataValue::Float(3.5));
    assert_eq!(stored["tags"], DataValue::from(vec!["rust"]));
    assert!(matches!(stored["born"], DataValue::DateTime(_)));
    // 未声明字段原样保存
    assert_eq!(stored["nickname"], DataValue::from("7"));
    assert_eq!(stored.get("_id"), record.id());
}

#[tokio::test]
async fn test_failed_validation_blocks_write() {
    let (driver, connections) = setup();
    let users = ModelManager::<User>::new(connections);

    let mut record = users.new_record(row(json!({"name": "", "age": 3})));
    assert!(!record.save(&WriteOptions::default()).await.unwrap());
    assert!(record.is_new());
    assert_eq!(driver.stats().saves, 0);
    assert_eq!(record.errors(), &[ValidationFailure { field: "Name".to_string() }]);

    // 第一个验证器失败后不再执行后面的验证器
    let mut both_bad = users.new_record(row(json!({"name": "", "age": -1})));
    assert!(!both_bad.validate());
    assert_eq!(both_bad.errors().len(), 1);

    record.set("name", "ann");
    assert!(record.validate());
    assert!(record.errors().is_empty());
}

#[tokio::test]
async fn test_hook_order() {
    let (driver, connections) = setup();
    let posts = ModelManager::<Post>::new(connections);

    let mut post = posts.new_record(row(json!({"title": "hello"})));
    assert_eq!(trail(post.attributes()), vec!["after_new"]);

    assert!(post.save(&WriteOptions::default()).await.unwrap());
    let stored = driver.documents("test", "posts");
    assert_eq!(
        trail(&stored[0]),
        vec!["after_new", "before_validation", "after_validation", "before_save"]
    );
    assert_eq!(trail(post.attributes()).last().map(String::as_str), Some("after_save"));

    // 加载的记录不触发 after_new
    let loaded = posts.find_one(&Filter::new(), &FindOptions::new()).await.unwrap().unwrap();
    assert_eq!(trail(loaded.attributes()).len(), 4);

    assert!(post.destroy().await.unwrap());
    assert_eq!(trail(post.attributes()).last().map(String::as_str), Some("before_destroy"));
    assert!(driver.documents("test", "posts").is_empty());
}

#[tokio::test]
async fn test_after_validation_runs_even_when_invalid() {
    let (driver, connections) = setup();
    let posts = ModelManager::<Post>::new(connections);

    let mut post = posts.new_record(Document::new());
    assert!(!post.save(&WriteOptions::default()).await.unwrap());
    assert_eq!(
        trail(post.attributes()),
        vec!["after_new", "before_validation", "after_validation"]
    );
    assert_eq!(driver.stats().saves, 0);
}

#[tokio::test]
async fn test_destroy_new_record_skips_store() {
    let (driver, connections) = setup();
    let users = ModelManager::<User>::new(connections);

    let mut record = users.new_record(row(json!({"name": "ann", "age": 1})));
    assert!(!record.destroy().await.unwrap());
    assert_eq!(driver.stats().removes, 0);

    record.save(&WriteOptions::default()).await.unwrap();
    assert!(record.destroy().await.unwrap());
    assert_eq!(driver.stats().removes, 1);
    assert_eq!(users.count(&Filter::new()).await.unwrap(), 0);
    // 内存中的记录仍可使用
    assert_eq!(record.get("name"), DataValue::from("ann"));
}

#[tokio::test]
async fn test_query_normalization_and_count_asymmetry() {
    let (_, connections) = setup();
    let users = ModelManager::<User>::new(connections);
    let mut record = users.new_record(row(json!({"name": "ann", "age": 5})));
    record.save(&WriteOptions::default()).await.unwrap();

    let by_string = Filter::from_json(json!({"age": "5"})).unwrap();
    let found = users.find_all(&by_string, &FindOptions::new()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(!found[0].is_new());

    // count 不做规范化
    assert_eq!(users.count(&by_string).await.unwrap(), 0);
    assert_eq!(users.count(&Filter::new().eq("age", 5)).await.unwrap(), 1);

    // $in 的候选值不转换
    let in_strings = Filter::from_json(json!({"age": {"$in": ["5", "6"]}})).unwrap();
    assert!(users.find_all(&in_strings, &FindOptions::new()).await.unwrap().is_empty());
    let in_ints = Filter::from_json(json!({"age": {"$in": [5, 6]}})).unwrap();
    assert_eq!(users.find_all(&in_ints, &FindOptions::new()).await.unwrap().len(), 1);

    let range = Filter::from_json(json!({"age": {"$gte": "1", "$lt": "10"}})).unwrap();
    assert_eq!(users.find_all(&range, &FindOptions::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_find_one() {
    let (_, connections) = setup();
    let users = ModelManager::<User>::new(connections);

    let none = users
        .find_one(&Filter::new().eq("name", "nobody"), &FindOptions::new())
        .await
        .unwrap();
    assert!(none.is_none());

    users
        .batch_insert(
            vec![row(json!({"name": "a", "age": 1})), row(json!({"name": "b", "age": 2}))],
            &WriteOptions::default(),
        )
        .await
        .unwrap();

    let first = users
        .find_one(&Filter::new(), &FindOptions::new().with_sort(vec![SortConfig::desc("age")]))
        .await
        .unwrap()
        .unwrap();
    assert!(!first.is_new());
    assert_eq!(first.get("name"), DataValue::from("b"));
}

#[tokio::test]
async fn test_find_options_and_lazy_cursor() {
    let (_, connections) = setup();
    let users = ModelManager::<User>::new(connections);
    let rows: Vec<Document> = (1..=5)
        .map(|i| row(json!({"name": format!("u{}", i), "age": i, "score": i})))
        .collect();
    users.batch_insert(rows, &WriteOptions::default()).await.unwrap();

    let options = FindOptions::new()
        .with_fields(vec!["name".to_string()])
        .with_sort(vec![SortConfig::desc("age")])
        .with_offset(1)
        .with_limit(2);
    let mut cursor = users.find(&Filter::new(), &options).await.unwrap();

    let first = cursor.next().await.unwrap().unwrap();
    assert_eq!(first.get("name"), DataValue::from("u4"));
    assert!(first.get("age").is_null());
    assert!(first.id().is_some());

    let rest = cursor.collect_all().await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].get("name"), DataValue::from("u3"));
}

#[tokio::test]
async fn test_cursor_as_stream() {
    use futures::TryStreamExt;

    let (_, connections) = setup();
    let users = ModelManager::<User>::new(connections);
    let rows: Vec<Document> = (0..3).map(|i| row(json!({"name": format!("s{}", i)}))).collect();
    users.batch_insert(rows, &WriteOptions::default()).await.unwrap();

    let cursor = users.find(&Filter::new(), &FindOptions::new()).await.unwrap();
    let records: Vec<ActiveRecord<User>> = cursor.into_stream().try_collect().await.unwrap();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_batch_insert_coerces_each_row() {
    let (driver, connections) = setup();
    let users = ModelManager::<User>::new(connections);

    let ids = users
        .batch_insert(
            vec![row(json!({"name": "a", "age": "1"})), row(json!({"name": "b", "age": "2"}))],
            &WriteOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(driver.stats().batch_inserts, 1);

    users
        .batch_insert(row(json!({"name": "c", "age": "3"})), &WriteOptions::default())
        .await
        .unwrap();

    let ages: Vec<DataValue> = driver
        .documents("test", "users")
        .iter()
        .map(|doc| doc["age"].clone())
        .collect();
    assert_eq!(ages, vec![DataValue::Int(1), DataValue::Int(2), DataValue::Int(3)]);
}

#[tokio::test]
async fn test_batch_insert_value_detection() {
    let (driver, connections) = setup();
    let users = ModelManager::<User>::new(connections);

    let batch = DataValue::from(json!([{"name": "a", "age": "1"}, {"name": "b", "age": "2"}]));
    assert_eq!(users.batch_insert_value(batch, &WriteOptions::default()).await.unwrap().len(), 2);

    let single = DataValue::from(json!({"age": "3", "name": "c"}));
    assert_eq!(users.batch_insert_value(single, &WriteOptions::default()).await.unwrap().len(), 1);

    // 首字段是数组的单行会被误判为多行，报告为输入错误而不是静默写入
    let misread = DataValue::from(json!({"aliases": ["x"], "name": "d"}));
    let result = users.batch_insert_value(misread, &WriteOptions::default()).await;
    assert!(matches!(result, Err(QuickRecordError::ValidationError { .. })));
    assert_eq!(driver.documents("test", "users").len(), 3);
}

#[tokio::test]
async fn test_remove_normalizes_filter() {
    let (_, connections) = setup();
    let users = ModelManager::<User>::new(connections);
    users
        .batch_insert(
            vec![row(json!({"name": "a", "age": 1})), row(json!({"name": "b", "age": 2}))],
            &WriteOptions::default(),
        )
        .await
        .unwrap();

    let removed = users
        .remove(&Filter::from_json(json!({"age": "1"})).unwrap(), &WriteOptions::default())
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(users.count(&Filter::new()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_dynamic_accessors() {
    let (_, connections) = setup();
    let users = ModelManager::<User>::new(connections);
    let mut record = users.new_record(Document::new());

    record
        .call("setFoo", vec![DataValue::Int(7)])
        .unwrap()
        .record()
        .unwrap()
        .call("setName", vec![DataValue::from("ann")])
        .unwrap();
    assert_eq!(record.call("getFoo", vec![]).unwrap().value(), Some(DataValue::Int(7)));
    assert_eq!(record.get("foo"), DataValue::Int(7));
    assert_eq!(record.get("name"), DataValue::from("ann"));

    record.call("setLastLogin", vec![DataValue::from("today")]).unwrap();
    assert_eq!(record.get("last_login"), DataValue::from("today"));

    // get 忽略多余参数，缺失属性返回 Null
    assert_eq!(
        record.call("getMissing", vec![DataValue::Int(1)]).unwrap().value(),
        Some(DataValue::Null)
    );

    record.call("setID", vec![DataValue::from("abc")]).unwrap();
    assert_eq!(record.id(), Some(&DataValue::from("abc")));
    assert_eq!(record.call("getId", vec![]).unwrap().value(), Some(DataValue::from("abc")));

    for (method, args) in [
        ("setFoo", vec![]),
        ("setFoo", vec![DataValue::Int(1), DataValue::Int(2)]),
        ("fooBar", vec![]),
        ("get", vec![]),
    ] {
        let outcome = record.call(method, args).map(|_| ());
        assert!(
            matches!(outcome, Err(QuickRecordError::InvalidAccessor { .. })),
            "{} should be rejected",
            method
        );
    }
}

#[tokio::test]
async fn test_lowercase_id_accessor_targets_underscore_id() {
    let (_, connections) = setup();
    let users = ModelManager::<User>::new(connections);
    let mut record = users.new_record(Document::new());

    record.call("setid", vec![DataValue::from("x")]).unwrap();
    println!("🔍 属性: {:?}", record.attributes());
    assert!(!record.attributes().contains_key("id"));
    assert_eq!(record.id(), Some(&DataValue::from("x")));
    assert_eq!(record.call("getid", vec![]).unwrap().value(), Some(DataValue::from("x")));
    assert_eq!(record.get("id"), DataValue::from("x"));
}

#[tokio::test]
async fn test_collection_names() {
    let (driver, connections) = setup();
    let blog_posts = ModelManager::<BlogPost>::new(connections.clone());
    assert_eq!(blog_posts.collection_name(), "blog_posts");

    let mut post = blog_posts.new_record(row(json!({"title": "t"})));
    post.save(&WriteOptions::default()).await.unwrap();
    assert_eq!(driver.documents("test", "blog_posts").len(), 1);
}

#[tokio::test]
async fn test_missing_database_is_config_error() {
    let driver = MemoryDriver::new();
    let config = StoreConfig::builder()
        .host("localhost:27017")
        .find_timeout_ms(1000)
        .build()
        .unwrap();
    let connections = Arc::new(ConnectionManager::new(Arc::new(driver.clone()), config));
    let users = ModelManager::<User>::new(connections.clone());

    let result = users.count(&Filter::new()).await;
    assert!(matches!(result, Err(QuickRecordError::ConfigError { .. })));

    connections.set_database("other").await;
    assert_eq!(users.count(&Filter::new()).await.unwrap(), 0);
    assert_eq!(driver.stats().connects, 1);
}

#[tokio::test]
async fn test_start_db_idempotent_unless_forced() {
    let (driver, connections) = setup();
    connections.start_db(None, None, false).await.unwrap();
    connections.start_db(Some("elsewhere:1"), Some("ignored"), false).await.unwrap();
    assert_eq!(driver.stats().connects, 1);
    assert_eq!(connections.database().await.as_deref(), Some("test"));

    connections.start_db(None, Some("blog"), true).await.unwrap();
    assert_eq!(driver.stats().connects, 2);
    assert_eq!(connections.database().await.as_deref(), Some("blog"));
}

#[tokio::test]
async fn test_lazy_reconnect() {
    let (driver, connections) = setup();
    let users = ModelManager::<User>::new(connections);
    users.count(&Filter::new()).await.unwrap();

    driver.disconnect();
    assert_eq!(users.count(&Filter::new()).await.unwrap(), 0);
    assert_eq!(driver.stats().reconnects, 1);
    assert_eq!(driver.stats().connects, 1);
}

#[tokio::test]
async fn test_find_timeout_and_indexes() {
    let (driver, connections) = setup();
    let users = ModelManager::<User>::new(connections);
    assert_eq!(users.find_timeout(), 20000);
    users.set_find_timeout(500);
    assert_eq!(users.find_timeout(), 500);

    users.find_all(&Filter::new(), &FindOptions::new()).await.unwrap();
    assert_eq!(driver.stats().last_find_timeout_ms, 500);
    users
        .find_all(&Filter::new(), &FindOptions::new().with_timeout(42))
        .await
        .unwrap();
    assert_eq!(driver.stats().last_find_timeout_ms, 42);

    let names = users.ensure_declared_indexes().await.unwrap();
    assert_eq!(names, vec!["name_1".to_string()]);
    assert_eq!(driver.index_names("test", "users"), vec!["name_1".to_string()]);

    let mut a = users.new_record(row(json!({"name": "dup", "age": 1})));
    assert!(a.save(&WriteOptions::default()).await.unwrap());
    let mut b = users.new_record(row(json!({"name": "dup", "age": 2})));
    assert!(b.save(&WriteOptions::default()).await.is_err());

    users.delete_index(&IndexKeys::new().asc("name")).await.unwrap();
    assert!(driver.index_names("test", "users").is_empty());
    assert!(b.save(&WriteOptions::default()).await.unwrap());
}
