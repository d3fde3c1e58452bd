use firestore_mock::doc;
use firestore_mock::errors::ErrorKind;
use firestore_mock::{SetOptions, Value};
use firestore_mock_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_read_reflects_last_write() {
    run_test(
        create_test_context,
        |ctx| {
            let doc = ctx.db().doc("foo/bar")?;
            doc.set(&doc! { v: 1 }).wait()?;
            doc.set(&doc! { v: 2, w: true }).wait()?;
            doc.set(&doc! { v: 3 }).wait()?;

            let snapshot = doc.get().wait()?;
            assert_eq!(snapshot.data()?, Some(doc! { v: 3 }));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_with_merge_layers_on_prior_value() {
    run_test(
        create_test_context,
        |ctx| {
            let doc = ctx.db().doc("foo/bar")?;
            doc.set(&doc! { color: "red", size: { w: 1, h: 2 } }).wait()?;
            doc.set_with_options(&doc! { size: { h: 5, d: 3 }, tool: "hammer" }, SetOptions::Merge)
                .wait()?;

            let snapshot = doc.get().wait()?;
            assert_eq!(
                snapshot.raw_data(),
                Some(&doc! { color: "red", size: { w: 1, h: 5, d: 3 }, tool: "hammer" })
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_with_merge_on_missing_document_creates_it() {
    run_test(
        create_test_context,
        |ctx| {
            let doc = ctx.db().doc("foo/new")?;
            doc.set_with_options(&doc! { a: 1 }, SetOptions::Merge).wait()?;
            assert_eq!(doc.get().wait()?.raw_data(), Some(&doc! { a: 1 }));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_set_with_merge_by_dotted_key() {
    run_test(
        create_test_context,
        |ctx| {
            let doc = ctx.db().doc("foo/bar")?;
            doc.set(&doc! { a: { b: 1, c: 2 } }).wait()?;
            doc.set_with_options(&doc! { "a.b": 5, "x.y.z": "deep" }, SetOptions::Merge)
                .wait()?;

            let snapshot = doc.get().wait()?;
            assert_eq!(
                snapshot.raw_data(),
                Some(&doc! { a: { b: 5, c: 2 }, x: { y: { z: "deep" } } })
            );
            assert_eq!(snapshot.get("a.b"), Some(&Value::from(5)));
            assert!(snapshot.raw_data().is_some_and(|data| !data.contains_key("a.b")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_by_dotted_key() {
    run_test(
        create_test_context,
        |ctx| {
            let doc = ctx.db().doc("foo/bar")?;
            doc.set(&doc! { foo: { foo: "old", bar: "kept" }, baz: 1 }).wait()?;
            doc.update(doc! { "foo.foo": "new" }).wait()?;

            let snapshot = doc.get().wait()?;
            assert_eq!(snapshot.get("foo.foo"), Some(&Value::from("new")));
            assert_eq!(snapshot.get("foo.bar"), Some(&Value::from("kept")));
            assert_eq!(snapshot.get("baz"), Some(&Value::from(1)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_creates_intermediate_maps() {
    run_test(
        create_test_context,
        |ctx| {
            let doc = ctx.db().doc("foo/bar")?;
            doc.set(&doc! { a: 1 }).wait()?;
            doc.update(doc! { "a.b.c": true }).wait()?;
            assert_eq!(doc.get().wait()?.raw_data(), Some(&doc! { a: { b: { c: true } } }));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_missing_document_is_not_found() {
    run_test(
        create_test_context,
        |ctx| {
            let err = ctx.db().doc("foo/missing")?.update(doc! { a: 1 }).wait().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NotFound);
            assert_eq!(err.code(), "not-found");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_removes_document() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let fruits = db.collection("fruits")?;
            let apple = fruits.doc("apple")?;
            apple.set(&doc! { color: "red" }).wait()?;
            fruits.doc("pear")?.set(&doc! { color: "green" }).wait()?;

            apple.delete().wait()?;
            assert!(!apple.get().wait()?.exists());
            let remaining = fruits.get().wait()?;
            assert_eq!(remaining.size(), 1);
            assert_eq!(remaining.docs()[0].id(), "pear");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_path_parity_is_enforced() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            assert_eq!(db.collection("foo/bar").unwrap_err().kind(), &ErrorKind::InvalidArgument);
            assert_eq!(db.doc("foo").unwrap_err().kind(), &ErrorKind::InvalidArgument);
            assert!(db.collection("foo")?.doc("x/y").is_err());
            assert!(db.doc("foo/bar")?.collection("x/y").is_err());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_references_build_through_paths() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo/bar/baz")?;
            assert_eq!(coll.id(), "baz");
            let parent = coll.parent().expect("nested collection has a parent");
            assert_eq!(parent.id(), "bar");
            assert_eq!(parent.parent().id(), "foo");
            assert!(parent.parent().parent().is_none());

            let doc = db.doc("foo/bar/baz/qux")?;
            assert_eq!(doc.id(), "qux");
            assert_eq!(doc.parent().path(), "foo/bar/baz");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_add_and_next_id() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let coll = db.collection("foo")?;
            let doc = coll.add(&doc! { foo: "bar" }).wait()?;
            assert_eq!(doc.id(), "__id0");
            assert_eq!(doc.get().wait()?.raw_data(), Some(&doc! { foo: "bar" }));
            assert_eq!(coll.new_doc().id(), "__id1");
            assert_eq!(db.next_id(), "__id2");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_same_path_shares_data_across_references() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let first = db.doc("a/b/c/d")?;
            let second = db.collection("a")?.doc("b")?.collection("c")?.doc("d")?;
            first.set(&doc! { n: 1 }).wait()?;
            assert_eq!(second.get().wait()?.raw_data(), Some(&doc! { n: 1 }));
            second.update(doc! { n: 2 }).wait()?;
            assert_eq!(first.get().wait()?.raw_data(), Some(&doc! { n: 2 }));
            Ok(())
        },
        cleanup,
    )
}
