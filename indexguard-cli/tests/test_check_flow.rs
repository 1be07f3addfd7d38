//! End-to-end check flows over real files

use indexguard::{run, CheckError, CheckRequest, Outcome, SkipSignals, SKIP_MARKER};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const SCHEMA_NO_INDEX: &str = r#"
ActiveRecord::Schema.define(version: 2024_01_20_120000) do
  create_table "users", force: :cascade do |t|
    t.string "email"
    t.bigint "company_id"
  end
end
"#;

const SCHEMA_WITH_INDEX: &str = r#"
ActiveRecord::Schema.define(version: 2024_01_20_120000) do
  create_table "users", force: :cascade do |t|
    t.string "email"
    t.bigint "company_id"
  end

  add_index "users", ["company_id"], name: "index_users_on_company_id"
end
"#;

const MIGRATION_ADD_COMPANY_ID: &str = r#"
class AddCompanyIdToUsers < ActiveRecord::Migration[7.0]
  def change
    add_column :users, :company_id, :bigint
  end
end
"#;

#[test]
fn test_uncovered_column_fails_with_one_violation() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.rb", SCHEMA_NO_INDEX);
    let migration = write_file(&dir, "migration.rb", MIGRATION_ADD_COMPANY_ID);

    let request = CheckRequest {
        schema_path: schema,
        changed_files: vec![migration],
        audit: false,
    };
    let outcome = run(&request, &SkipSignals::default()).unwrap();

    let Outcome::Checked(report) = outcome else {
        panic!("expected a checked outcome");
    };
    assert!(!report.passed());
    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.table, "users");
    assert_eq!(violation.column, "company_id");
    assert_eq!(violation.kind.token(), "bigint");
}

#[test]
fn test_covered_column_passes() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.rb", SCHEMA_WITH_INDEX);
    let migration = write_file(&dir, "migration.rb", MIGRATION_ADD_COMPANY_ID);

    let request = CheckRequest {
        schema_path: schema,
        changed_files: vec![migration],
        audit: false,
    };
    let outcome = run(&request, &SkipSignals::default()).unwrap();
    assert!(outcome.passed());
}

#[test]
fn test_composite_index_covers_either_column() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(
        &dir,
        "schema.rb",
        r#"
create_table "orders", force: :cascade do |t|
  t.bigint "user_id"
  t.bigint "product_id"
  t.index ["user_id", "product_id"], name: "index_orders_on_user_and_product"
end
"#,
    );

    for column in ["user_id", "product_id"] {
        let migration = write_file(
            &dir,
            &format!("add_{}.rb", column),
            &format!("add_column :orders, :{}, :bigint\n", column),
        );
        let request = CheckRequest {
            schema_path: schema.clone(),
            changed_files: vec![migration],
            audit: false,
        };
        let outcome = run(&request, &SkipSignals::default()).unwrap();
        assert!(outcome.passed(), "{} should be covered", column);
    }
}

#[test]
fn test_polymorphic_pair_reports_composite_remedy() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(
        &dir,
        "schema.rb",
        r#"
create_table "comments", force: :cascade do |t|
  t.uuid "commentable_id"
  t.string "commentable_type"
end
"#,
    );
    let migration = write_file(
        &dir,
        "migration.rb",
        "add_column :comments, :commentable_id, :uuid\n",
    );

    let request = CheckRequest {
        schema_path: schema,
        changed_files: vec![migration],
        audit: false,
    };
    let outcome = run(&request, &SkipSignals::default()).unwrap();

    let Outcome::Checked(report) = outcome else {
        panic!("expected a checked outcome");
    };
    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.polymorphic.as_deref(), Some("commentable"));
    let text = violation.render();
    assert!(text.contains("add_index :comments, [:commentable_type, :commentable_id]"));
}

#[test]
fn test_type_change_path_detected_across_files() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(
        &dir,
        "schema.rb",
        r#"
create_table "albums", force: :cascade do |t|
  t.bigint "comment_id"
end
"#,
    );
    let first = write_file(
        &dir,
        "m1_create.rb",
        "create_table :albums do |t|\nend\nadd_column :albums, :comment_id, :string\n",
    );
    let second = write_file(
        &dir,
        "m2_convert.rb",
        "change_column :albums, :comment_id, :bigint\n",
    );

    let request = CheckRequest {
        schema_path: schema,
        changed_files: vec![first, second],
        audit: false,
    };
    let outcome = run(&request, &SkipSignals::default()).unwrap();

    let Outcome::Checked(report) = outcome else {
        panic!("expected a checked outcome");
    };
    assert!(!report.passed());
    assert_eq!(report.violations[0].kind.token(), "bigint");
}

#[test]
fn test_skip_flag_short_circuits_failing_scenario() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.rb", SCHEMA_NO_INDEX);
    let migration = write_file(&dir, "migration.rb", MIGRATION_ADD_COMPANY_ID);

    let request = CheckRequest {
        schema_path: schema,
        changed_files: vec![migration],
        audit: false,
    };
    let signals = SkipSignals {
        override_flag: true,
        ..SkipSignals::default()
    };
    let outcome = run(&request, &signals).unwrap();
    assert!(matches!(outcome, Outcome::Skipped(_)));
    assert!(outcome.passed());
}

#[test]
fn test_skip_marker_in_commit_message() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.rb", SCHEMA_NO_INDEX);
    let migration = write_file(&dir, "migration.rb", MIGRATION_ADD_COMPANY_ID);

    let request = CheckRequest {
        schema_path: schema,
        changed_files: vec![migration],
        audit: false,
    };
    let signals = SkipSignals {
        head_message: Some(format!("intentional denormalization {}", SKIP_MARKER)),
        ..SkipSignals::default()
    };
    let outcome = run(&request, &signals).unwrap();
    assert!(outcome.passed());
}

#[test]
fn test_missing_snapshot_is_fatal() {
    let dir = TempDir::new().unwrap();
    let migration = write_file(&dir, "migration.rb", MIGRATION_ADD_COMPANY_ID);

    let request = CheckRequest {
        schema_path: dir.path().join("does_not_exist.rb"),
        changed_files: vec![migration],
        audit: false,
    };
    let result = run(&request, &SkipSignals::default());
    assert!(matches!(result, Err(CheckError::SchemaNotFound(_))));
}

#[test]
fn test_audit_mode_walks_whole_schema() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(
        &dir,
        "schema.rb",
        r#"
create_table "users", force: :cascade do |t|
  t.bigint "company_id"
end
create_table "orders", force: :cascade do |t|
  t.bigint "user_id"
  t.index ["user_id"], name: "index_orders_on_user_id"
end
"#,
    );

    let request = CheckRequest {
        schema_path: schema,
        changed_files: Vec::new(),
        audit: true,
    };
    let outcome = run(&request, &SkipSignals::default()).unwrap();

    let Outcome::Checked(report) = outcome else {
        panic!("expected a checked outcome");
    };
    assert!(report.audit);
    assert_eq!(report.inspected, 2);
    assert_eq!(report.covered, 1);
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].table, "users");
}

#[test]
fn test_idempotent_across_runs() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.rb", SCHEMA_NO_INDEX);
    let migration = write_file(&dir, "migration.rb", MIGRATION_ADD_COMPANY_ID);

    let render = || {
        let request = CheckRequest {
            schema_path: schema.clone(),
            changed_files: vec![migration.clone()],
            audit: false,
        };
        match run(&request, &SkipSignals::default()).unwrap() {
            Outcome::Checked(report) => (report.render(), report.passed()),
            other => panic!("unexpected outcome: {:?}", other),
        }
    };

    let first = render();
    let second = render();
    assert_eq!(first, second);
}
