// tests/ledger_persistence.rs
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use shop_ledger::capture::import_csv;
use shop_ledger::ledger::Ledger;
use shop_ledger::record::Value;
use shop_ledger::sources::cardmarket_products;
use shop_ledger::record;
use shop_ledger::store::{FileStore, KvStore};

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("shop_ledger_{}", name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

#[test]
fn saved_records_reload_in_order() {
    let dir = tmp_dir("reload");
    let mut ledger = Ledger::load(FileStore::new(&dir), "items");
    assert!(ledger.is_empty());

    ledger.append(vec![record! { "a" => 1 }, record! { "a" => 2 }]);
    ledger.save();

    let again = Ledger::load(FileStore::new(&dir), "items");
    assert_eq!(again.records(), &[record! { "a" => 1 }, record! { "a" => 2 }]);
}

#[test]
fn repeated_deduped_append_keeps_one() {
    let dir = tmp_dir("dedupe");
    let key = |r: &shop_ledger::record::Record| format!("{}|{}", r.cell("title"), r.cell("price"));
    for _ in 0..2 {
        let mut ledger = Ledger::load(FileStore::new(&dir), "sales");
        ledger.append_deduped(vec![record! { "title" => "X", "price" => "5" }], key);
        ledger.save();
    }
    assert_eq!(Ledger::load(FileStore::new(&dir), "sales").len(), 1);
}

#[test]
fn corrupt_file_loads_empty_and_is_replaced_on_save() {
    let dir = tmp_dir("corrupt");
    let store = FileStore::new(&dir);
    fs::write(store.path_for("items"), "{not json").unwrap();

    let mut ledger = Ledger::load(store, "items");
    assert!(ledger.is_empty());
    ledger.append(vec![record! { "a" => "ok" }]);
    ledger.save();
    assert_eq!(Ledger::load(FileStore::new(&dir), "items").len(), 1);
}

#[test]
fn scope_marker_is_per_day_and_survives_reload() {
    let dir = tmp_dir("markers");
    let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let tomorrow = today.succ_opt().unwrap();

    let mut ledger = Ledger::load(FileStore::new(&dir), "prices");
    assert!(!ledger.has_scope_run_on("pageA", today));
    ledger.mark_scope_run("pageA", today);
    assert!(ledger.has_scope_run_on("pageA", today));

    let reloaded = Ledger::load(FileStore::new(&dir), "prices");
    assert!(reloaded.has_scope_run_on("pageA", today));
    assert!(!reloaded.has_scope_run_on("pageA", tomorrow));
    assert!(!reloaded.has_scope_run_on("pageB", today));
}

#[test]
fn reset_only_touches_its_own_namespace() {
    let dir = tmp_dir("reset");
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

    let mut a = Ledger::load(FileStore::new(&dir), "a");
    a.append(vec![record! { "x" => 1 }]);
    a.mark_scope_run("/p?q=1", day);
    a.save();
    let mut b = Ledger::load(FileStore::new(&dir), "b");
    b.append(vec![record! { "x" => 2 }]);
    b.mark_scope_run("/p?q=1", day);
    b.save();

    a.reset();
    assert!(a.is_empty());
    assert!(!a.has_scope_run_on("/p?q=1", day));

    let store = FileStore::new(&dir);
    assert_eq!(store.get("a").unwrap(), None);
    assert!(store.keys_with_prefix("a:").unwrap().is_empty());
    assert_eq!(Ledger::load(FileStore::new(&dir), "b").len(), 1);
    assert!(b.has_scope_run_on("/p?q=1", day));
}

#[test]
fn imported_nan_price_does_not_wipe_history_on_reload() {
    let dir = tmp_dir("nan_import");
    let schema = &cardmarket_products::SCHEMA;

    let mut ledger = Ledger::load(FileStore::new(&dir), schema.namespace);
    ledger.append(import_csv(schema, "ID,Price\n1,3.5", ','));
    ledger.append(import_csv(schema, "ID,Price\n2,NaN\n3,inf", ','));
    ledger.save();

    let again = Ledger::load(FileStore::new(&dir), schema.namespace);
    assert_eq!(again.len(), 3);
    assert_eq!(again.records()[0].get("price"), Some(&Value::Number(3.5)));
    assert_eq!(again.records()[1].get("price"), Some(&Value::Number(0.0)));
    assert_eq!(again.records()[2].cell("id"), "3");
}

#[test]
fn long_scope_key_marks_and_resets_on_disk() {
    let dir = tmp_dir("long_scope");
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let scope = format!("/en/Magic/Products/Singles?{}", "idExpansion=1234&sortBy=price_asc&".repeat(12));

    let mut ledger = Ledger::load(FileStore::new(&dir), "cm_price_history");
    ledger.mark_scope_run(&scope, day);
    assert!(Ledger::load(FileStore::new(&dir), "cm_price_history").has_scope_run_on(&scope, day));

    for entry in fs::read_dir(&dir).unwrap() {
        let name = entry.unwrap().file_name();
        assert!(name.len() < 255, "{name:?}");
    }

    ledger.reset();
    assert!(!Ledger::load(FileStore::new(&dir), "cm_price_history").has_scope_run_on(&scope, day));
}
