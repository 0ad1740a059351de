#![allow(dead_code)]

use std::fs;
use std::path::Path;

use lexnet_core::{DatasetLoader, FileSource, GraphStore, Session};
use serde_json::{json, Value};
use tempfile::TempDir;

pub fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

pub fn node(id: &str, name: &str, kind: &str, scope: &str) -> Value {
    json!({ "id": id, "name": name, "node_type": kind, "time": scope })
}

pub fn link(source: &str, target: &str, kind: &str, scope: &str) -> Value {
    json!({ "source": source, "target": target, "edge_type": kind, "time": scope })
}

/// A small slice of a tax code in two time scopes.
///
/// Title "26" is split in two parts; part two repeats `s61` in scope
/// "after" under another name and repeats one link. Title "18" is a
/// single file with embedded-object endpoints. Title "99" points at a
/// missing file, title "7" at a malformed one.
pub fn tax_dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write_json(
        root,
        "manifest.json",
        &json!({
            "version": 1,
            "titles": [
                { "id": "26", "kind": "split", "meta": "title-26.meta.json", "label": "Internal Revenue Code" },
                { "id": 18, "kind": "single", "file": "title-18.json" },
                { "id": "99", "kind": "single", "file": "title-99.json" },
                { "id": "7", "kind": "single", "file": "title-7.json" }
            ]
        }),
    );

    write_json(
        root,
        "title-26.meta.json",
        &json!({ "parts": [ { "file": "title-26.part1.json" }, { "file": "title-26.part2.json" } ] }),
    );

    let mut s61_after = node("s61", "Gross income defined", "section", "after");
    s61_after["text"] = json!("gross income means all income from whatever source derived");
    let mut s63_after = node("s63", "Taxable income defined", "section", "after");
    s63_after["text"] = json!("taxable income means gross income minus the deductions allowed");
    let mut s1_after = node("s1", "Tax imposed", "section", "after");
    s1_after["text"] = json!("there is hereby imposed on the taxable income of every individual a tax");

    write_json(
        root,
        "title-26.part1.json",
        &json!({
            "nodes": [
                node("s61", "Gross income defined", "section", "before"),
                node("s63", "Taxable income defined", "section", "before"),
                node("s1", "Tax imposed", "section", "before"),
                node("c_income", "Income", "concept", "before"),
                node("c_tax", "Tax", "concept", "before"),
                node("e_sec", "Secretary", "entity", "before"),
                s61_after,
                s63_after,
                s1_after
            ],
            "links": [
                link("s1", "c_tax", "definition", "before"),
                link("s1", "s63", "reference", "before"),
                link("s63", "s61", "reference", "before"),
                link("s61", "c_income", "definition", "before"),
                link("s1", "c_tax", "definition", "after"),
                link("s1", "s63", "reference", "after")
            ]
        }),
    );

    write_json(
        root,
        "title-26.part2.json",
        &json!({
            "nodes": [
                node("s61", "DUPLICATE", "section", "after"),
                node("c_income", "Income", "concept", "after"),
                node("c_tax", "Tax", "concept", "after"),
                node("e_sec", "Secretary", "entity", "after"),
                node("s199a", "Qualified business income deduction", "section", "after")
            ],
            "links": [
                link("s1", "s63", "reference", "after"),
                link("s63", "s61", "reference", "after"),
                link("s61", "c_income", "definition", "after"),
                link("s63", "c_income", "definition", "after"),
                link("s1", "e_sec", "reference", "after"),
                link("s199a", "s63", "reference", "after")
            ]
        }),
    );

    write_json(
        root,
        "title-18.json",
        &json!({
            "nodes": [
                node("s1001", "Statements or entries generally", "section", "after"),
                node("e_agency", "Agency", "entity", "after")
            ],
            "links": [
                {
                    "source": { "id": "s1001", "name": "Statements or entries generally" },
                    "target": { "id": "e_agency" },
                    "type": "reference",
                    "time": "after"
                }
            ]
        }),
    );

    fs::write(root.join("title-7.json"), b"{ \"nodes\": [ this is not json").unwrap();

    dir
}

pub fn store(dir: &TempDir) -> GraphStore<FileSource> {
    GraphStore::new(DatasetLoader::new(FileSource::new(dir.path()), "manifest.json"))
}

pub fn session(dir: &TempDir) -> Session<FileSource> {
    Session::new(store(dir), "after")
}
