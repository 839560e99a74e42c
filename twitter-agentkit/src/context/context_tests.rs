//! Tests for restoring and capturing action contexts.

#[cfg(test)]
mod tests {
    use crate::client::ClientHandle;
    use crate::context::{ActionContext, ContextSnapshot, ContextVar};
    use crate::errors::ActionError;
    use crate::testing::InMemoryTwitterClient;
    use serde_json::json;
    use std::sync::Arc;

    const PAYLOAD: ContextVar<String> = ContextVar::new("payload");
    const COUNTER: ContextVar<u64> = ContextVar::new("counter");
    const QUEUE: ContextVar<Vec<String>> = ContextVar::new("queue");

    fn client() -> ClientHandle {
        Arc::new(InMemoryTwitterClient::new())
    }

    #[test]
    fn test_restore_initial_snapshot() {
        let client = client();
        let snapshot = ContextSnapshot::initial(Arc::clone(&client));

        let ctx = ActionContext::restore(&snapshot, &client).unwrap();
        assert!(ctx.keys().is_empty());
        assert_eq!(ctx.generation(), 0);
        assert_eq!(ctx.snapshot_id(), snapshot.snapshot_id());
        assert!(Arc::ptr_eq(ctx.client(), &client));
    }

    #[test]
    fn test_data_round_trips_through_capture() {
        let client = client();
        let initial = ContextSnapshot::initial(Arc::clone(&client));

        let mut ctx = ActionContext::restore(&initial, &client).unwrap();
        ctx.set(&PAYLOAD, &"x".to_string()).unwrap();
        ctx.set(&COUNTER, &7).unwrap();
        let next = ctx.capture(&initial);

        assert_eq!(next.generation(), 1);
        assert_eq!(next.get_value("payload"), Some(&json!("x")));

        let ctx = ActionContext::restore(&next, &client).unwrap();
        assert_eq!(ctx.get(&PAYLOAD).unwrap(), Some("x".to_string()));
        assert_eq!(ctx.get(&COUNTER).unwrap(), Some(7));
        assert_eq!(ctx.get(&QUEUE).unwrap(), None);
    }

    #[test]
    fn test_capture_replaces_rather_than_merges() {
        let client = client();
        let initial = ContextSnapshot::initial(Arc::clone(&client));

        let mut ctx = ActionContext::restore(&initial, &client).unwrap();
        ctx.set_value("a", json!(1));
        ctx.set_value("b", json!(2));
        let second = ctx.capture(&initial);

        let mut ctx = ActionContext::restore(&second, &client).unwrap();
        assert!(ctx.remove("a"));
        let third = ctx.capture(&second);

        assert!(!third.contains("a"));
        assert!(third.contains("b"));
        // Earlier snapshots are untouched.
        assert!(second.contains("a"));
    }

    #[test]
    fn test_handles_survive_while_owned() {
        let client = client();
        let initial = ContextSnapshot::initial(Arc::clone(&client));
        let owned = Arc::new(String::from("monitor"));
        let var: ContextVar<String> = ContextVar::new("monitor-thread");

        let mut ctx = ActionContext::restore(&initial, &client).unwrap();
        ctx.set_handle(&var, Arc::clone(&owned));
        let next = ctx.capture(&initial);

        let ctx = ActionContext::restore(&next, &client).unwrap();
        let handle = ctx.handle(&var).unwrap().unwrap();
        assert!(Arc::ptr_eq(&handle, &owned));
    }

    #[test]
    fn test_dropped_handle_fails_restore() {
        let client = client();
        let initial = ContextSnapshot::initial(Arc::clone(&client));
        let var: ContextVar<u32> = ContextVar::new("ephemeral");

        let mut ctx = ActionContext::restore(&initial, &client).unwrap();
        ctx.set_handle(&var, Arc::new(1_u32));
        let next = ctx.capture(&initial);

        let err = ActionContext::restore(&next, &client).unwrap_err();
        assert_eq!(err.variable, "ephemeral");
        assert!(err.reason.contains("u32"));
    }

    #[test]
    fn test_foreign_client_fails_restore() {
        let snapshot = ContextSnapshot::initial(client());
        let err = ActionContext::restore(&snapshot, &client()).unwrap_err();
        assert_eq!(err.variable, "client");
    }

    #[test]
    fn test_type_mismatches_are_reported() {
        let client = client();
        let initial = ContextSnapshot::initial(Arc::clone(&client));
        let owned = Arc::new(3_u8);
        let handle_var: ContextVar<u8> = ContextVar::new("h");

        let mut ctx = ActionContext::restore(&initial, &client).unwrap();
        ctx.set_value("payload", json!({"not": "a string"}));
        ctx.set_handle(&handle_var, Arc::clone(&owned));

        assert!(matches!(
            ctx.get(&PAYLOAD),
            Err(ActionError::ContextValue { .. })
        ));

        let wrong_type: ContextVar<String> = ContextVar::new("h");
        assert!(ctx.handle(&wrong_type).is_err());

        let data_as_handle: ContextVar<String> = ContextVar::new("payload");
        assert!(ctx.handle(&data_as_handle).is_err());
    }
}
