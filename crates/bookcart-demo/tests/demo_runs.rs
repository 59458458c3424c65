//! Demo E2E Tests
//!
//! Runs the demo front-ends end to end over scripted input, the way the
//! binary does, and checks the text they produce.
//!
//! ```sh
//! cargo test -p bookcart-demo --test demo_runs
//! ```

#![cfg(test)]

use bookcart_demo::app::{self, PROMPT};
use bookcart_demo::cli::{Opts, RunMode};
use bookcart_demo::session::SessionMode;
use std::io::Cursor;

fn run_to_string(opts: &Opts, input: &str) -> String {
    let mut out = Vec::new();
    app::run(opts, Cursor::new(input.to_string()), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn memory_opts(mode: RunMode) -> Opts {
    Opts {
        mode,
        memory: true,
        ..Opts::default()
    }
}

#[test]
fn store_checkout_session() {
    let opts = memory_opts(RunMode::Store);
    let out = run_to_string(&opts, "add 1\nadd 2\ncart\ncheckout\ncomplete\nquit\n");

    assert!(out.contains("BookStore | 0 items in cart"));
    assert!(out.contains("BookStore | 2 items in cart | $42.49"));
    assert!(out.contains("Order Summary"));
    assert!(out.contains("** Order placed successfully!"));
    assert!(out.starts_with("BookStore"));
    assert!(out.contains(PROMPT));
}

#[test]
fn store_cart_persists_across_runs_in_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let opts = Opts {
        mode: RunMode::Store,
        state_path: Some(dir.path().join("state.json")),
        ..Opts::default()
    };

    run_to_string(&opts, "add 3\nadd 7\n");
    let second = run_to_string(&opts, "");
    assert!(second.contains("BookStore | 2 items in cart | $35.25"));
    assert!(second.contains("[x] #3"));
}

#[test]
fn custom_catalog_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(
        &path,
        r#"[{"id":10,"name":"Dune","author":"Frank Herbert","price":9.99}]"#,
    )
    .unwrap();
    let opts = Opts {
        catalog: Some(path),
        ..memory_opts(RunMode::Store)
    };

    let out = run_to_string(&opts, "add 10\n");
    assert!(out.contains("[x] #10  Dune by Frank Herbert  $9.99"));
}

#[test]
fn missing_catalog_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let opts = Opts {
        catalog: Some(dir.path().join("absent.json")),
        ..memory_opts(RunMode::Store)
    };
    let err = app::run(&opts, Cursor::new(String::new()), Vec::new()).unwrap_err();
    assert!(err.to_string().contains("failed to read catalog"));
}

#[test]
fn shelf_add_search_delete() {
    let opts = memory_opts(RunMode::Shelf);
    let out = run_to_string(
        &opts,
        "add Animal Farm | George Orwell | 16.5\nadd Dune | Frank Herbert\nsearch orwell\n",
    );
    assert!(out.contains("Bookstore CRUD"));
    assert!(out.contains("1 of 2 books shown"));
    assert!(out.contains("$16.50"));
}

#[test]
fn session_sequential_prints_steps_in_order() {
    let opts = Opts {
        mode: RunMode::Session,
        user: "vishal".into(),
        time_scale: 0.0,
        ..Opts::default()
    };
    let out = run_to_string(&opts, "");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "vishal logged in successfully",
            "Data fetched successfully",
            "Data calculated successfully",
            "Message sent successfully",
            "vishal logged out successfully",
        ]
    );
}

#[test]
fn session_concurrent_prints_fetch_last() {
    let opts = Opts {
        mode: RunMode::Session,
        session: SessionMode::Concurrent,
        time_scale: 0.0,
        ..Opts::default()
    };
    let out = run_to_string(&opts, "");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.first(), Some(&"guest logged in successfully"));
    assert_eq!(lines.last(), Some(&"Data fetched successfully"));
    assert_eq!(lines.len(), 5);
}
