use firestore_mock::errors::ErrorKind;
use firestore_mock::{doc, DocumentSnapshot, Firestore, Settings};
use firestore_mock_int_test::test_util::{cleanup, create_test_context, run_test, Recorder, TestContext};

#[test]
fn test_persistence_before_start() {
    run_test(
        || Ok(TestContext::new(Firestore::new())),
        |ctx| {
            let db = ctx.db();
            db.enable_persistence().wait()?;
            assert!(db.is_persistence_enabled());

            db.collection("foo")?;
            let err = db.enable_persistence().wait().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FailedPrecondition);
            let err = db.clear_persistence().wait().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FailedPrecondition);
            assert!(db.is_persistence_enabled());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_settings_before_start() {
    run_test(
        || Ok(TestContext::new(Firestore::new())),
        |ctx| {
            let db = ctx.db();
            let settings = Settings {
                host: Some("localhost:8080".to_string()),
                ssl: Some(false),
                ..Settings::default()
            };
            db.settings(settings.clone())?;
            assert_eq!(db.current_settings(), settings);

            db.doc("foo/bar")?;
            let err = db.settings(Settings::default()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FailedPrecondition);
            assert_eq!(db.current_settings(), settings);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_terminate_completes_listeners_and_rejects_operations() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let doc = db.doc("foo/bar")?;
            doc.set(&doc! { a: 1 }).wait()?;

            let completions = Recorder::<()>::new();
            let complete = completions.callback();
            let snapshots = Recorder::<DocumentSnapshot>::new();
            let observer = firestore_mock::Observer::new()
                .on_next(snapshots.callback())
                .on_complete(move || complete(()));
            let registration = doc.on_snapshot_with(firestore_mock::ListenArgs::Observer(observer))?;
            db.flush();
            assert_eq!(snapshots.len(), 1);

            db.terminate().wait()?;
            assert!(db.is_terminated());
            assert!(!registration.is_active());
            assert_eq!(completions.len(), 1);

            assert_eq!(db.collection("foo").unwrap_err().kind(), &ErrorKind::FailedPrecondition);
            assert_eq!(doc.get().wait().unwrap_err().kind(), &ErrorKind::FailedPrecondition);
            assert!(doc.set(&doc! { a: 2 }).wait().is_err());
            assert!(db.batch().is_err());
            assert!(db.wait_for_pending_writes().wait().is_err());

            db.clear_persistence().wait()?;
            assert_eq!(snapshots.len(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unsupported_operations_report_unimplemented() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            assert_eq!(db.enable_network().wait().unwrap_err().code(), "unimplemented");
            assert_eq!(db.disable_network().wait().unwrap_err().code(), "unimplemented");
            assert_eq!(db.load_bundle(b"bundle").wait().unwrap_err().code(), "unimplemented");
            assert_eq!(db.named_query("latest").wait().unwrap_err().code(), "unimplemented");
            assert!(db.on_snapshots_in_sync(|| {}).is_err());
            assert!(db.collection_group("a/b").is_err());
            assert!(db.collection_group("").is_err());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_auto_id_prefix_from_builder() {
    run_test(
        || {
            let db = Firestore::builder().auto_id_prefix("doc-").open()?;
            Ok(TestContext::new(db))
        },
        |ctx| {
            let db = ctx.db();
            let reference = db.collection("things")?.add(&doc! { n: 1 }).wait()?;
            assert_eq!(reference.id(), "doc-0");
            assert_eq!(db.next_id(), "doc-1");
            assert!(Firestore::builder().auto_id_prefix("a/b").open().is_err());
            Ok(())
        },
        cleanup,
    )
}
