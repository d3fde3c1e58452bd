use firestore_mock::errors::ErrorKind;
use firestore_mock::{doc, DocumentSnapshot, QuerySnapshot, SetOptions};
use firestore_mock_int_test::test_util::{cleanup, create_test_context, run_test, Recorder};

#[test]
fn test_set_update_delete() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            let doc1 = coll.doc("doc1")?;
            let doc2 = coll.doc("doc2")?;
            let doc3 = coll.doc("doc3")?;
            doc3.set(&doc! { gone: false }).wait()?;

            let batch = db.batch()?;
            batch
                .set(&doc1, &doc! { foo: "bar", n: 1 })
                .update(&doc1, doc! { n: 2 })
                .set_with_options(&doc2, &doc! { nested: { a: 1 } }, SetOptions::Merge)
                .delete(&doc3);
            assert_eq!(batch.len(), 4);
            // nothing is visible before commit
            assert!(!doc1.get().wait()?.exists());

            batch.commit().wait()?;
            assert_eq!(doc1.get().wait()?.raw_data(), Some(&doc! { foo: "bar", n: 2 }));
            assert_eq!(doc2.get().wait()?.raw_data(), Some(&doc! { nested: { a: 1 } }));
            assert!(!doc3.get().wait()?.exists());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_one_notification_per_document() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            let doc1 = coll.doc("doc1")?;
            let doc2 = coll.doc("doc2")?;
            let doc1_snapshots = Recorder::<DocumentSnapshot>::new();
            let doc2_snapshots = Recorder::<DocumentSnapshot>::new();
            let _doc1_listener = doc1.on_snapshot(doc1_snapshots.callback())?;
            let _doc2_listener = doc2.on_snapshot(doc2_snapshots.callback())?;

            let batch = db.batch()?;
            batch
                .set(&doc1, &doc! { foo: "bar" })
                .update(&doc1, doc! { foo: "baz" })
                .set(&doc2, &doc! { foo: "qux" });
            batch.commit().wait()?;

            assert_eq!(doc1_snapshots.len(), 2);
            assert_eq!(doc2_snapshots.len(), 2);
            let last = doc1_snapshots.last().expect("snapshot after commit");
            assert_eq!(last.raw_data(), Some(&doc! { foo: "baz" }));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unchanged_document_is_not_announced() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let doc = db.doc("foo/doc1")?;
            doc.set(&doc! { foo: "bar" }).wait()?;
            let snapshots = Recorder::<DocumentSnapshot>::new();
            let _listener = doc.on_snapshot(snapshots.callback())?;

            let batch = db.batch()?;
            batch.set(&doc, &doc! { foo: "bar" });
            batch.commit().wait()?;
            assert_eq!(snapshots.len(), 1);

            // created and deleted within one batch leaves nothing to announce
            let transient = db.doc("foo/transient")?;
            let batch = db.batch()?;
            batch.set(&transient, &doc! { n: 1 }).delete(&transient);
            batch.commit().wait()?;
            assert!(!transient.get().wait()?.exists());
            assert_eq!(snapshots.len(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_query_listener_sees_batch_as_one_change() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            let snapshots = Recorder::<QuerySnapshot>::new();
            let _listener = coll.on_snapshot(snapshots.callback())?;

            let batch = db.batch()?;
            batch
                .set(&coll.doc("a")?, &doc! { n: 1 })
                .set(&coll.doc("b")?, &doc! { n: 2 });
            batch.commit().wait()?;

            // one delivery per announced document, each seeing the full batch
            assert_eq!(snapshots.len(), 3);
            let sizes: Vec<_> = snapshots.all().iter().map(|s| s.size()).collect();
            assert_eq!(sizes, vec![0, 2, 2]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failed_operation_rejects_whole_batch() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let kept = db.doc("foo/kept")?;
            let missing = db.doc("foo/missing")?;

            let batch = db.batch()?;
            batch.set(&kept, &doc! { n: 1 }).update(&missing, doc! { n: 2 });
            let err = batch.commit().wait().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NotFound);
            assert!(!kept.get().wait()?.exists());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_batch_cannot_be_reused() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let doc = db.doc("foo/doc1")?;
            let batch = db.batch()?;
            batch.set(&doc, &doc! { n: 1 });
            batch.commit().wait()?;

            let err = batch.commit().wait().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FailedPrecondition);

            let fresh = db.batch()?;
            assert!(fresh.is_empty());
            let err = fresh
                .set_with_options(&doc, &doc! { n: 2 }, SetOptions::MergeFields(vec!["n".into()]))
                .commit()
                .wait()
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::Unimplemented);
            assert_eq!(doc.get().wait()?.raw_data(), Some(&doc! { n: 1 }));
            Ok(())
        },
        cleanup,
    )
}
