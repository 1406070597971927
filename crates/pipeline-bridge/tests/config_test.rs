use std::env;

use pipeline_bridge::{DeleteMode, SyncConfig};

// One test function: the cases share process-wide environment variables.
#[test]
fn test_sync_config_from_env() {
    // 1. Unset falls back to optimistic deletes
    unsafe {
        env::remove_var("PIPELINE_STRICT_DELETE");
    }
    let config = SyncConfig::from_env().unwrap();
    assert_eq!(config.delete_mode, DeleteMode::Optimistic);
    assert!(config.fetch_on_start);

    // 2. Truthy values turn strict mode on, case and padding aside
    for value in ["1", "true", " YES "] {
        unsafe {
            env::set_var("PIPELINE_STRICT_DELETE", value);
        }
        let config = SyncConfig::from_env().unwrap();
        assert_eq!(config.delete_mode, DeleteMode::Strict, "value {value:?}");
    }

    // 3. Falsy values keep it off
    for value in ["0", "false", ""] {
        unsafe {
            env::set_var("PIPELINE_STRICT_DELETE", value);
        }
        let config = SyncConfig::from_env().unwrap();
        assert_eq!(config.delete_mode, DeleteMode::Optimistic, "value {value:?}");
    }

    // 4. Anything else is an error naming the variable
    unsafe {
        env::set_var("PIPELINE_STRICT_DELETE", "maybe");
    }
    let err = SyncConfig::from_env().unwrap_err();
    assert_eq!(err.to_string(), "Invalid PIPELINE_STRICT_DELETE 'maybe'");

    unsafe {
        env::remove_var("PIPELINE_STRICT_DELETE");
    }
}
