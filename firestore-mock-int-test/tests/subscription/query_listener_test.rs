use firestore_mock::errors::ErrorKind;
use firestore_mock::{doc, DocumentChangeType, FirestoreError, ListenArgs, QuerySnapshot};
use firestore_mock_int_test::test_util::{cleanup, create_strict_test_context, create_test_context, run_test, Recorder};

fn ids(snapshot: &QuerySnapshot) -> Vec<String> {
    snapshot.docs().iter().map(|doc| doc.id().to_string()).collect()
}

#[test]
fn test_delivery_per_write_to_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            let snapshots = Recorder::<QuerySnapshot>::new();
            let registration = coll.on_snapshot(snapshots.callback())?;

            coll.doc("a")?.set(&doc! { n: 1 }).wait()?;
            coll.doc("b")?.set(&doc! { n: 2 }).wait()?;
            coll.doc("a")?.delete().wait()?;
            assert_eq!(snapshots.len(), 4);
            let sizes: Vec<_> = snapshots.all().iter().map(|s| s.size()).collect();
            assert_eq!(sizes, vec![0, 1, 2, 1]);

            registration.remove();
            coll.doc("c")?.set(&doc! { n: 3 }).wait()?;
            assert_eq!(snapshots.len(), 4);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_first_snapshot_reports_every_document_added() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            coll.doc("a")?.set(&doc! { n: 1 }).wait()?;
            coll.doc("b")?.set(&doc! { n: 2 }).wait()?;

            let snapshots = Recorder::<QuerySnapshot>::new();
            let _registration = coll.on_snapshot(snapshots.callback())?;
            db.flush();

            let first = snapshots.last().expect("initial snapshot");
            let changes = first.doc_changes();
            assert_eq!(changes.len(), 2);
            for (index, change) in changes.iter().enumerate() {
                assert_eq!(change.change_type, DocumentChangeType::Added);
                assert_eq!(change.old_index, -1);
                assert_eq!(change.new_index, index as isize);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_changes_between_consecutive_snapshots() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            coll.doc("a")?.set(&doc! { n: 1 }).wait()?;
            coll.doc("b")?.set(&doc! { n: 2 }).wait()?;
            coll.doc("c")?.set(&doc! { n: 3 }).wait()?;

            let snapshots = Recorder::<QuerySnapshot>::new();
            let _registration = coll.on_snapshot(snapshots.callback())?;

            coll.doc("b")?.update(doc! { n: 20 }).wait()?;
            let modified = snapshots.last().expect("snapshot after update").doc_changes();
            assert_eq!(modified.len(), 1);
            assert_eq!(modified[0].change_type, DocumentChangeType::Modified);
            assert_eq!(modified[0].doc.id(), "b");
            assert_eq!((modified[0].old_index, modified[0].new_index), (1, 1));

            coll.doc("a")?.delete().wait()?;
            let removed = snapshots.last().expect("snapshot after delete").doc_changes();
            let removal = removed
                .iter()
                .find(|c| c.change_type == DocumentChangeType::Removed)
                .expect("a removal");
            assert_eq!(removal.doc.id(), "a");
            assert_eq!((removal.old_index, removal.new_index), (0, -1));
            // b and c shifted up one position
            let moved: Vec<_> = removed
                .iter()
                .filter(|c| c.change_type == DocumentChangeType::Modified)
                .map(|c| (c.doc.id().to_string(), c.old_index, c.new_index))
                .collect();
            assert_eq!(moved, vec![("b".to_string(), 1, 0), ("c".to_string(), 2, 1)]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unchanged_result_has_no_changes() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            coll.doc("a")?.set(&doc! { n: 1 }).wait()?;

            let snapshots = Recorder::<QuerySnapshot>::new();
            let _registration = coll.where_op("n", ">", 0)?.on_snapshot(snapshots.callback())?;

            // filtered out, but still re-delivered
            coll.doc("z")?.set(&doc! { n: (-1) }).wait()?;
            assert_eq!(snapshots.len(), 2);
            let last = snapshots.last().expect("redelivery");
            assert_eq!(ids(&last), vec!["a"]);
            assert!(last.doc_changes().is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_strict_policy_skips_unchanged_results() {
    run_test(
        create_strict_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            coll.doc("a")?.set(&doc! { n: 1 }).wait()?;

            let snapshots = Recorder::<QuerySnapshot>::new();
            let _registration = coll.where_op("n", ">", 0)?.on_snapshot(snapshots.callback())?;
            db.flush();
            assert_eq!(snapshots.len(), 1);

            coll.doc("z")?.set(&doc! { n: (-1) }).wait()?;
            coll.doc("a")?.set(&doc! { n: 1 }).wait()?;
            assert_eq!(snapshots.len(), 1);

            coll.doc("b")?.set(&doc! { n: 5 }).wait()?;
            assert_eq!(snapshots.len(), 2);
            let changes = snapshots.last().expect("changed result").doc_changes();
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].change_type, DocumentChangeType::Added);
            assert_eq!(changes[0].doc.id(), "b");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_ordered_listener_tracks_moves() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            coll.doc("first")?.set(&doc! { foo: 100 }).wait()?;
            coll.doc("second")?.set(&doc! { foo: 50 }).wait()?;

            let snapshots = Recorder::<QuerySnapshot>::new();
            let query = coll.order_by("foo", firestore_mock::Direction::Ascending)?.limit(1);
            let _registration = query.on_snapshot(snapshots.callback())?;

            coll.doc("third")?.set(&doc! { foo: 10 }).wait()?;
            let last = snapshots.last().expect("snapshot after insert");
            assert_eq!(ids(&last), vec!["third"]);
            let changes = last.doc_changes();
            assert_eq!(changes.len(), 2);
            assert_eq!(changes[0].change_type, DocumentChangeType::Added);
            assert_eq!(changes[0].doc.id(), "third");
            assert_eq!(changes[1].change_type, DocumentChangeType::Removed);
            assert_eq!(changes[1].doc.id(), "second");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_listen_errors_reach_error_callback() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            let snapshots = Recorder::<QuerySnapshot>::new();
            let errors = Recorder::<FirestoreError>::new();

            let _registration = coll
                .limit_to_last(1)
                .on_snapshot_with(ListenArgs::callback_with_error(snapshots.callback(), errors.callback()))?;
            db.flush();

            assert!(snapshots.is_empty());
            assert_eq!(errors.len(), 1);
            let error = errors.last().expect("an error");
            assert_eq!(error.kind(), &ErrorKind::InvalidArgument);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_query_listener_inside_callback() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            let snapshots = Recorder::<QuerySnapshot>::new();
            let slot = std::sync::Arc::new(std::sync::Mutex::new(None::<firestore_mock::ListenerRegistration>));

            let record = snapshots.callback();
            let callback_slot = slot.clone();
            let registration = coll.on_snapshot(move |snapshot: QuerySnapshot| {
                let size = snapshot.size();
                record(snapshot);
                if size > 0 {
                    if let Some(registration) = callback_slot.lock().unwrap().take() {
                        registration.remove();
                    }
                }
            })?;
            *slot.lock().unwrap() = Some(registration.clone());

            coll.doc("a")?.set(&doc! { n: 1 }).wait()?;
            coll.doc("b")?.set(&doc! { n: 2 }).wait()?;
            assert_eq!(snapshots.len(), 2);
            assert!(!registration.is_active());
            Ok(())
        },
        cleanup,
    )
}
