//! Runs against a live S3-compatible service, e.g.
//! `docker run -p 9000:9000 minio/minio server /data` with a `testbuck`
//! bucket and `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` exported.
//! Set `CASBIN_S3_TEST_ENDPOINT=http://localhost:9000` to enable.

use std::time::{SystemTime, UNIX_EPOCH};

use casbin::{Adapter, CoreApi, DefaultModel, Enforcer, Model};
use casbin_s3_adapter::{S3Adapter, StoreConfig, StoreError};

const MODEL: &str = r#"
[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = r.sub == p.sub && r.obj == p.obj && r.act == p.act
"#;

fn test_config(key: &str) -> Option<StoreConfig> {
    let endpoint = match std::env::var("CASBIN_S3_TEST_ENDPOINT") {
        Ok(e) => e,
        Err(_) => {
            println!("Skipping test - CASBIN_S3_TEST_ENDPOINT not set");
            return None;
        }
    };
    let region = std::env::var("CASBIN_S3_TEST_REGION").unwrap_or_else(|_| "my-region".into());
    let bucket = std::env::var("CASBIN_S3_TEST_BUCKET").unwrap_or_else(|_| "testbuck".into());
    let mut cfg = StoreConfig::new(endpoint, region, bucket, key);
    cfg.operation_timeout_secs = Some(10);
    Some(cfg)
}

fn unique_key(name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("casbin-s3-adapter-tests/{name}-{}-{nanos}.csv", std::process::id())
}

#[tokio::test]
async fn test_s3_save_load_enforce() {
    let Some(cfg) = test_config(&unique_key("policy")) else {
        return;
    };
    let mut adapter = S3Adapter::new(cfg.clone()).await.unwrap();

    let mut m = DefaultModel::from_str(MODEL).await.unwrap();
    m.add_policy("p", "p", vec!["alice".into(), "data1".into(), "read".into()]);
    if let Err(e) = adapter.save_policy(&mut m).await {
        println!("Skipping test - object storage not available: {e}");
        return;
    }

    let mut loaded = DefaultModel::from_str(MODEL).await.unwrap();
    adapter.load_policy(&mut loaded).await.unwrap();
    assert_eq!(
        loaded.get_values_for_field_in_policy("p", "p", 0),
        vec!["alice".to_string()]
    );

    let fresh = DefaultModel::from_str(MODEL).await.unwrap();
    let e = Enforcer::new(fresh, S3Adapter::new(cfg).await.unwrap())
        .await
        .unwrap();
    assert!(e.enforce(("alice", "data1", "read")).unwrap());
    assert!(!e.enforce(("alice", "data1", "write")).unwrap());
}

#[tokio::test]
async fn test_s3_missing_key() {
    let Some(cfg) = test_config(&unique_key("missing")) else {
        return;
    };
    let adapter = S3Adapter::new(cfg).await.unwrap();

    let mut m = DefaultModel::from_str(MODEL).await.unwrap();
    match adapter.load(&mut m).await {
        Err(e @ StoreError::Retrieval { .. }) if e.is_not_found() => {}
        Err(e) => println!("Skipping test - object storage not available: {e}"),
        Ok(n) => panic!("loaded {n} rules from a key that was never written"),
    }
    assert!(m.get_policy("p", "p").is_empty());
}
