use gradlet_core::config::{
    get_default_persist_config, set_default_persist_config, PersistConfig, DEFAULT_CHUNK_THRESHOLD,
    DEFAULT_EDIT_DELAY, DEFAULT_GROUP_NAME,
};
use std::{thread, time::Duration};

#[test]
fn defaults() {
    let config = PersistConfig::default();
    assert_eq!(config.chunk_threshold(), DEFAULT_CHUNK_THRESHOLD);
    assert_eq!(config.edit_delay(), DEFAULT_EDIT_DELAY);
    assert_eq!(config.group_name(), DEFAULT_GROUP_NAME);
}

#[test]
fn chunking_threshold_is_inclusive() {
    let config = PersistConfig::new().with_chunk_threshold(10);
    assert!(!config.is_chunked(9));
    assert!(config.is_chunked(10));
    assert!(config.is_chunked(11));
}

#[test]
fn thread_default_can_be_replaced() {
    let custom = PersistConfig::new()
        .with_chunk_threshold(5)
        .with_edit_delay(Duration::ZERO)
        .with_group_name("ckpt");
    set_default_persist_config(custom.clone());
    assert_eq!(get_default_persist_config(), custom);

    // other threads keep their own default
    let other = thread::spawn(get_default_persist_config).join().unwrap();
    assert_eq!(other, PersistConfig::default());
}
