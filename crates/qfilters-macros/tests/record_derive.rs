//! Integration tests for the Record derive macro.

#![allow(dead_code)] // Some fields are intentionally skipped

use std::sync::Arc;

use qfilters_macros::Record;
use qfilters_store::chrono::NaiveDate;
use qfilters_store::{
    Choice, FieldKind, Lookup, MemoryStore, Model, Number, Predicate, Query, Record as _,
    RecordStore, RelationDescriptor, Value,
};

fn grades() -> Vec<Choice> {
    vec![Choice::new(1, "Junior"), Choice::new(2, "Senior")]
}

#[derive(Debug, Record)]
struct Dept {
    #[field(Integer)]
    id: i64,
    #[field(Char)]
    code: String,
}

fn dept_relation() -> RelationDescriptor {
    let depts = MemoryStore::new(vec![
        Dept {
            id: 1,
            code: "eng".into(),
        },
        Dept {
            id: 2,
            code: "ops".into(),
        },
    ]);
    RelationDescriptor::new(Arc::new(depts))
}

#[derive(Debug, Record)]
struct Employee {
    #[field(Char)]
    name: String,

    #[field(Boolean)]
    active: bool,

    #[field(Integer, choices = "grades")]
    grade: i32,

    #[field(Date, rename = "hired", verbose_name = "hired on")]
    hire_date: NaiveDate,

    #[field(ForeignKey, relation = "dept_relation")]
    dept: Option<i64>,

    #[field(skip)]
    cache_key: u64,

    notes: String,
}

fn employee(name: &str, active: bool, grade: i32, dept: Option<i64>) -> Employee {
    Employee {
        name: name.to_string(),
        active,
        grade,
        hire_date: NaiveDate::from_ymd_opt(2022, 4, 1).unwrap(),
        dept,
        cache_key: 0,
        notes: String::new(),
    }
}

#[test]
fn field_constants_generated() {
    assert_eq!(Employee::NAME, "name");
    assert_eq!(Employee::ACTIVE, "active");
    assert_eq!(Employee::GRADE, "grade");
    assert_eq!(Employee::HIRED, "hired");
    assert_eq!(Employee::DEPT, "dept");
}

#[test]
fn field_values_read_through_to_value() {
    let e = employee("ann", true, 2, Some(1));
    assert_eq!(e.field_value("name"), Value::String("ann"));
    assert_eq!(e.field_value("active"), Value::Bool(true));
    assert_eq!(e.field_value("grade"), Value::Number(Number::I64(2)));
    assert_eq!(
        e.field_value("hired"),
        Value::Date(NaiveDate::from_ymd_opt(2022, 4, 1).unwrap())
    );
    assert_eq!(e.field_value("dept"), Value::Number(Number::I64(1)));
}

#[test]
fn skipped_and_unannotated_fields_are_hidden() {
    let e = employee("ann", true, 2, None);
    assert_eq!(e.field_value("cache_key"), Value::None);
    assert_eq!(e.field_value("notes"), Value::None);
    assert_eq!(e.field_value("hire_date"), Value::None);
    assert_eq!(e.field_value("dept"), Value::None);
}

#[test]
fn model_lists_descriptors_in_order() {
    let fields = Employee::fields();
    let summary: Vec<_> = fields.iter().map(|f| (f.name.as_str(), f.kind)).collect();
    assert_eq!(
        summary,
        vec![
            ("name", FieldKind::Char),
            ("active", FieldKind::Boolean),
            ("grade", FieldKind::Integer),
            ("hired", FieldKind::Date),
            ("dept", FieldKind::ForeignKey),
        ]
    );
    assert_eq!(fields[3].verbose_name, "hired on");
    assert_eq!(fields[0].verbose_name, "name");
    assert_eq!(fields[2].choices.as_ref().map(Vec::len), Some(2));
    assert!(fields[4].relation.is_some());
}

#[test]
fn derived_records_work_with_queries() {
    let store = MemoryStore::new(vec![
        employee("ann", true, 2, Some(1)),
        employee("bo", false, 1, Some(2)),
        employee("cy", true, 1, None),
    ]);
    let query = Query::all()
        .filter(Predicate::leaf(Employee::ACTIVE, Lookup::Exact, true).unwrap())
        .filter(Predicate::leaf(Employee::DEPT, Lookup::IsNull, false).unwrap());
    let found = store.fetch(&query).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "ann");
}
