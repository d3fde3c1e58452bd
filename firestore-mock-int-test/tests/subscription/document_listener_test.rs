use firestore_mock::{doc, DocumentSnapshot, ListenerRegistration, Observer};
use firestore_mock_int_test::test_util::{cleanup, create_test_context, run_test, Recorder};
use futures::executor::block_on;
use std::sync::{Arc, Mutex};

#[test]
fn test_delivery_count_follows_writes() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let doc = db.doc("foo/bar")?;
            let snapshots = Recorder::<DocumentSnapshot>::new();
            let registration = doc.on_snapshot(snapshots.callback())?;

            db.flush();
            assert_eq!(snapshots.len(), 1);
            assert!(!snapshots.all()[0].exists());

            doc.set(&doc! { n: 1 }).wait()?;
            doc.set(&doc! { n: 1 }).wait()?;
            doc.update(doc! { n: 2 }).wait()?;
            assert_eq!(snapshots.len(), 4);
            let last = snapshots.last().expect("a snapshot was delivered");
            assert_eq!(last.raw_data(), Some(&doc! { n: 2 }));

            registration.remove();
            doc.set(&doc! { n: 3 }).wait()?;
            assert_eq!(snapshots.len(), 4);
            assert!(!registration.is_active());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_first_delivery_is_deferred() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let doc = db.doc("foo/bar")?;
            doc.set(&doc! { n: 1 }).wait()?;

            let snapshots = Recorder::<DocumentSnapshot>::new();
            let _registration = doc.on_snapshot(snapshots.callback())?;
            assert!(snapshots.is_empty());

            block_on(doc.get())?;
            assert_eq!(snapshots.len(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_snapshot_is_taken_at_write_time() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let doc = db.doc("foo/bar")?;
            let snapshots = Recorder::<DocumentSnapshot>::new();
            let _registration = doc.on_snapshot(snapshots.callback())?;

            // queue several deliveries before draining any of them
            let _ = doc.set(&doc! { n: 1 });
            let _ = doc.set(&doc! { n: 2 });
            let _ = doc.delete();
            db.flush();

            let values: Vec<_> = snapshots.all().iter().map(|s| s.raw_data().cloned()).collect();
            assert_eq!(values, vec![None, Some(doc! { n: 1 }), Some(doc! { n: 2 }), None]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unrelated_writes_are_not_delivered() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let doc = db.doc("foo/bar")?;
            let snapshots = Recorder::<DocumentSnapshot>::new();
            let _registration = doc.on_snapshot(snapshots.callback())?;

            db.doc("foo/other")?.set(&doc! { n: 1 }).wait()?;
            doc.collection("nested")?.doc("child")?.set(&doc! { n: 1 }).wait()?;
            db.doc("bar/bar")?.set(&doc! { n: 1 }).wait()?;
            assert_eq!(snapshots.len(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_inside_own_callback() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let doc = db.doc("foo/bar")?;
            let slot: Arc<Mutex<Option<ListenerRegistration>>> = Arc::new(Mutex::new(None));
            let snapshots = Recorder::<DocumentSnapshot>::new();

            let record = snapshots.callback();
            let callback_slot = slot.clone();
            let registration = doc.on_snapshot(move |snapshot: DocumentSnapshot| {
                let exists = snapshot.exists();
                record(snapshot);
                if exists {
                    if let Some(registration) = callback_slot.lock().unwrap().as_ref() {
                        registration.remove();
                    }
                }
            })?;
            *slot.lock().unwrap() = Some(registration.clone());

            let _ = doc.set(&doc! { n: 1 });
            let _ = doc.set(&doc! { n: 2 });
            db.flush();
            assert_eq!(snapshots.len(), 2);
            assert!(!registration.is_active());

            doc.set(&doc! { n: 3 }).wait()?;
            assert_eq!(snapshots.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_observer_and_remove_is_idempotent() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let doc = db.doc("foo/bar")?;
            let snapshots = Recorder::<DocumentSnapshot>::new();
            let completions = Recorder::<()>::new();
            let complete = completions.callback();
            let observer = Observer::new()
                .on_next(snapshots.callback())
                .on_complete(move || complete(()));

            let registration = doc.on_snapshot_with(observer.into())?;
            db.flush();
            registration.remove();
            registration.remove();
            assert_eq!(snapshots.len(), 1);

            // a removed listener does not complete on terminate
            db.terminate().wait()?;
            assert!(completions.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_listener_inside_callback_writes() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let source = db.doc("foo/source")?;
            let mirror = db.doc("foo/mirror")?;
            let target = mirror.clone();
            let _registration = source.on_snapshot(move |snapshot: DocumentSnapshot| {
                if let Some(data) = snapshot.raw_data() {
                    let _ = target.set(data);
                }
            })?;

            source.set(&doc! { copied: true }).wait()?;
            assert_eq!(mirror.get().wait()?.raw_data(), Some(&doc! { copied: true }));
            Ok(())
        },
        cleanup,
    )
}
