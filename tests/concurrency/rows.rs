//! Row Store Concurrency Tests
//!
//! Two calls of the same operation on the same key, started together:
//! - create / create
//! - exists / exists
//! - get / get
//! - delete / delete

use crate::*;
use std::sync::Barrier;
use std::thread;

/// Run `f` on `n` threads released by one barrier and collect the results.
fn race<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize) -> T + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let barrier = Arc::new(Barrier::new(n));
    let handles: Vec<_> = (0..n)
        .map(|i| {
            let f = Arc::clone(&f);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                f(i)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn concurrent_create_row_same_key() {
    let db = create_db();
    let rows = Arc::clone(&db.rows);

    let results = race(2, move |i| rows.create_row("row1", format!("value{}", i + 1)));
    for r in results {
        r.unwrap();
    }

    let value = db.rows.get_row("row1").unwrap();
    assert!(value == "value1" || value == "value2", "unexpected {}", value);
}

#[test]
fn concurrent_does_row_exist() {
    let db = create_db();
    db.rows.create_row("row1", "value1").unwrap();
    let rows = Arc::clone(&db.rows);

    let results = race(2, move |_| rows.does_row_exist("row1"));
    assert_eq!(results, vec![true, true]);
}

#[test]
fn concurrent_get_row() {
    let db = create_db();
    db.rows.create_row("row1", "value1").unwrap();
    let rows = Arc::clone(&db.rows);

    let results = race(2, move |_| rows.get_row("row1"));
    for r in results {
        assert_eq!(r.unwrap(), "value1");
    }
}

#[test]
fn concurrent_delete_row() {
    let db = create_db();
    db.rows.create_row("row1", "value1").unwrap();
    let rows = Arc::clone(&db.rows);

    let results = race(2, move |_| rows.delete_row("row1"));
    let existed: Vec<bool> = results.into_iter().map(|r| r.unwrap()).collect();
    assert_eq!(existed.iter().filter(|e| **e).count(), 1);
    assert!(!db.rows.does_row_exist("row1"));
}

#[test]
fn read_your_write() {
    let db = create_db();
    db.rows.create_row("row1", "value1").unwrap();
    assert_eq!(db.rows.get_row("row1").unwrap(), "value1");
}

#[test]
fn delete_of_missing_key_is_noop() {
    let db = create_db();
    assert!(!db.rows.delete_row("never").unwrap());
    assert!(db.rows.is_empty());
}

#[test]
fn concrete_row1_scenario() {
    let db = create_db();
    db.rows.create_row("row1", "value1").unwrap();

    let rows = Arc::clone(&db.rows);
    let gets = race(2, move |_| rows.get_row("row1"));
    assert!(gets.into_iter().all(|g| g.unwrap() == "value1"));

    let rows = Arc::clone(&db.rows);
    let exists = race(2, move |_| rows.does_row_exist("row1"));
    assert_eq!(exists, vec![true, true]);

    let rows = Arc::clone(&db.rows);
    let deletes = race(2, move |_| rows.delete_row("row1"));
    assert!(deletes.into_iter().all(|d| d.is_ok()));

    assert!(!db.rows.does_row_exist("row1"));
}

#[test]
fn mixed_contention_on_one_key_stays_consistent() {
    const THREADS: usize = 8;
    const ITERS: usize = 200;
    let db = RowDb::builder().single_lock().open().unwrap();
    let rows = Arc::clone(&db.rows);

    race(THREADS, move |t| {
        for i in 0..ITERS {
            match (t + i) % 4 {
                0 => {
                    rows.create_row("hot", format!("t{}-{}", t, i)).unwrap();
                }
                1 => {
                    if let Ok(v) = rows.get_row("hot") {
                        assert!(v.starts_with('t') && v.contains('-'), "torn value {}", v);
                    }
                }
                2 => {
                    rows.delete_row("hot").unwrap();
                }
                _ => {
                    rows.does_row_exist("hot");
                }
            }
        }
    });

    // At most one row for the key, whichever state it ended in
    assert!(db.rows.len() <= 1);
}

#[test]
fn different_keys_do_not_interfere() {
    const THREADS: usize = 8;
    let db = create_db();
    let rows = Arc::clone(&db.rows);

    race(THREADS, move |t| {
        for i in 0..100 {
            let key = format!("t{}-k{}", t, i);
            rows.create_row(&key, key.clone()).unwrap();
            assert_eq!(rows.get_row(&key).unwrap(), key);
        }
    });

    assert_eq!(db.rows.len(), THREADS * 100);
}
