//! Terraform snippets rendered from approved recommendations.
//!
//! Pure string templating over a handful of recommendation fields. This
//! is not an IaC generator; the output is a starting point a human reviews
//! and applies, returned verbatim in the approval response.

use serde_json::Value;

use opsforge_types::request::Domain;

fn str_or<'a>(rec: &'a Value, key: &str, default: &'a str) -> &'a str {
    rec.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn u64_or(rec: &Value, key: &str, default: u64) -> u64 {
    rec.get(key).and_then(Value::as_u64).unwrap_or(default)
}

fn bool_or(rec: &Value, key: &str, default: bool) -> bool {
    rec.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Render a snippet for the given domain's recommendation. Accepts either
/// the bare recommendation object or the synthesized wrapper the
/// orchestrator stores. Incident sessions have no infrastructure artifact.
pub fn render(domain: Domain, recommendation: &Value) -> Option<String> {
    match domain {
        Domain::Sql => {
            let rec = recommendation
                .get("provisioning_recommendation")
                .unwrap_or(recommendation);
            Some(render_sql_instance(rec))
        }
        Domain::Nosql => {
            let rec = recommendation
                .get("table_recommendation")
                .unwrap_or(recommendation);
            Some(render_nosql_table(rec))
        }
        Domain::Incident => None,
    }
}

/// RDS instance from a SQL provisioning recommendation.
pub fn render_sql_instance(rec: &Value) -> String {
    let engine = str_or(rec, "engine", "postgres");
    let version = str_or(rec, "engine_version", "16.4");
    let instance_class = str_or(rec, "instance_class", "db.r6g.large");
    let storage_gb = u64_or(rec, "storage_gb", 100);
    let multi_az = bool_or(rec, "multi_az", true);
    let retention = u64_or(rec, "backup_retention_days", 7);
    let encrypted = bool_or(rec, "encryption_at_rest", true);

    format!(
        r#"resource "aws_db_instance" "main" {{
  engine                  = "{engine}"
  engine_version          = "{version}"
  instance_class          = "{instance_class}"
  allocated_storage       = {storage_gb}
  storage_type            = "gp3"
  multi_az                = {multi_az}
  backup_retention_period = {retention}
  storage_encrypted       = {encrypted}
  publicly_accessible     = false
}}
"#
    )
}

/// DynamoDB table from a NoSQL provisioning recommendation.
pub fn render_nosql_table(rec: &Value) -> String {
    let table_name = str_or(rec, "table_name", "app-table");
    let partition_key = str_or(rec, "partition_key", "pk");
    let sort_key = str_or(rec, "sort_key", "sk");
    let billing_mode = str_or(rec, "billing_mode", "PAY_PER_REQUEST");
    let pitr = bool_or(rec, "point_in_time_recovery", false);

    let mut out = format!(
        r#"resource "aws_dynamodb_table" "main" {{
  name         = "{table_name}"
  billing_mode = "{billing_mode}"
  hash_key     = "{partition_key}"
  range_key    = "{sort_key}"

  attribute {{
    name = "{partition_key}"
    type = "S"
  }}

  attribute {{
    name = "{sort_key}"
    type = "S"
  }}

  point_in_time_recovery {{
    enabled = {pitr}
  }}
"#
    );

    if let Some(indexes) = rec.get("global_secondary_indexes").and_then(Value::as_array) {
        for gsi in indexes {
            let name = str_or(gsi, "name", "gsi");
            let hash = str_or(gsi, "partition_key", "pk");
            out.push_str(&format!(
                r#"
  global_secondary_index {{
    name            = "{name}"
    hash_key        = "{hash}"
    projection_type = "ALL"
  }}
"#
            ));
        }
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sql_instance_from_recommendation() {
        let rec = json!({
            "engine": "mysql",
            "engine_version": "8.0",
            "instance_class": "db.m6g.xlarge",
            "storage_gb": 500,
            "multi_az": false,
        });
        let hcl = render_sql_instance(&rec);
        assert!(hcl.contains(r#"engine                  = "mysql""#));
        assert!(hcl.contains("allocated_storage       = 500"));
        assert!(hcl.contains("multi_az                = false"));
    }

    #[test]
    fn test_sql_instance_defaults_on_empty() {
        let hcl = render_sql_instance(&json!({}));
        assert!(hcl.contains(r#"engine                  = "postgres""#));
        assert!(hcl.contains("storage_encrypted       = true"));
    }

    #[test]
    fn test_nosql_table_with_gsi() {
        let rec = json!({
            "table_name": "orders",
            "partition_key": "order_id",
            "global_secondary_indexes": [
                {"name": "by_status", "partition_key": "status"}
            ],
        });
        let hcl = render_nosql_table(&rec);
        assert!(hcl.contains(r#"name         = "orders""#));
        assert!(hcl.contains(r#"hash_key        = "status""#));
    }

    #[test]
    fn test_incident_has_no_artifact() {
        assert!(render(Domain::Incident, &json!({})).is_none());
        assert!(render(Domain::Sql, &json!({})).is_some());
    }

    #[test]
    fn test_render_unwraps_synthesized_recommendation() {
        let wrapped = json!({
            "provisioning_recommendation": {"engine": "mysql"}
        });
        let hcl = render(Domain::Sql, &wrapped).unwrap();
        assert!(hcl.contains(r#"engine                  = "mysql""#));
    }
}
