use firestore_mock::errors::FirestoreResult;
use firestore_mock::{doc, Direction, Firestore, QuerySnapshot};
use firestore_mock_int_test::test_util::{cleanup, create_test_context, run_test, Recorder};

// foo at the top level, under a document, and two levels down
fn seed_foo_groups(db: &Firestore) -> FirestoreResult<()> {
    db.doc("foo/top")?.set(&doc! { level: 0 }).wait()?;
    db.doc("some/delicious/foo/one")?.set(&doc! { level: 1 }).wait()?;
    db.doc("some/delicious/foo/one/in_another/foo/two")?
        .set(&doc! { level: 2 })
        .wait()?;
    db.doc("some/delicious/bar/three")?.set(&doc! { level: 1 }).wait()?;
    Ok(())
}

fn paths(snapshot: &QuerySnapshot) -> Vec<String> {
    snapshot.docs().iter().map(|doc| doc.reference().path()).collect()
}

#[test]
fn test_get_spans_nested_collections() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            seed_foo_groups(&db)?;

            let snapshot = db.collection_group("foo")?.get().wait()?;
            assert_eq!(
                paths(&snapshot),
                vec!["some/delicious/foo/one", "some/delicious/foo/one/in_another/foo/two"]
            );
            assert!(db.collection_group("nothing")?.get().wait()?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_group_query_clauses_apply_across_collections() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            seed_foo_groups(&db)?;
            db.doc("other/doc/foo/three")?.set(&doc! { level: 5 }).wait()?;

            let group = db.collection_group("foo")?;
            let deepest = group.order_by("level", Direction::Descending)?.limit(2).get().wait()?;
            assert_eq!(paths(&deepest), vec!["other/doc/foo/three", "some/delicious/foo/one/in_another/foo/two"]);

            let shallow = group.where_op("level", "<", 2)?.get().wait()?;
            assert_eq!(paths(&shallow), vec!["some/delicious/foo/one"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_listener_follows_group_membership() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            seed_foo_groups(&db)?;

            let snapshots = Recorder::<QuerySnapshot>::new();
            let registration = db.collection_group("foo")?.on_snapshot(snapshots.callback())?;
            db.flush();
            assert_eq!(snapshots.len(), 1);

            db.doc("some/delicious/foo/one")?.update(doc! { level: 10 }).wait()?;
            assert_eq!(snapshots.len(), 2);

            // a brand new member collection is picked up
            db.doc("fresh/doc/foo/new")?.set(&doc! { level: 3 }).wait()?;
            assert_eq!(snapshots.len(), 3);
            let last = snapshots.last().expect("snapshot with new member");
            assert_eq!(last.size(), 3);

            db.doc("fresh/doc/foo/newer")?.set(&doc! { level: 4 }).wait()?;
            assert_eq!(snapshots.len(), 4);

            // neither a top-level foo nor a differently named collection counts
            db.doc("foo/another")?.set(&doc! { level: 0 }).wait()?;
            db.doc("fresh/doc/bar/x")?.set(&doc! { level: 0 }).wait()?;
            assert_eq!(snapshots.len(), 4);

            registration.remove();
            db.doc("fresh/doc/foo/after")?.set(&doc! { level: 9 }).wait()?;
            db.doc("late/doc/foo/after")?.set(&doc! { level: 9 }).wait()?;
            assert_eq!(snapshots.len(), 4);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_group_changes_are_diffed() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            seed_foo_groups(&db)?;
            let snapshots = Recorder::<QuerySnapshot>::new();
            let _registration = db.collection_group("foo")?.on_snapshot(snapshots.callback())?;

            db.doc("some/delicious/foo/one")?.delete().wait()?;
            let changes = snapshots.last().expect("snapshot after delete").doc_changes();
            let kinds: Vec<_> = changes
                .iter()
                .map(|c| (c.change_type.to_string(), c.doc.id().to_string()))
                .collect();
            assert_eq!(
                kinds,
                vec![("modified".to_string(), "two".to_string()), ("removed".to_string(), "one".to_string())]
            );
            Ok(())
        },
        cleanup,
    )
}
