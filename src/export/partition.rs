//! Partition report rows by vault

use crate::models::{LogRecord, VaultEmailMap};

/// Rows of one vault together with its recipients
#[derive(Debug, Clone)]
pub struct VaultPartition<'a> {
    pub vault_id: &'a str,
    pub recipients: &'a [String],
    pub records: Vec<&'a LogRecord>,
}

/// Group records by vault, in vault-map order
///
/// Only vaults that are both configured and have at least one record are
/// returned. Records keep their fetch order inside each partition.
pub fn group_by_vault<'a>(
    records: &'a [LogRecord],
    vault_map: &'a VaultEmailMap,
) -> Vec<VaultPartition<'a>> {
    vault_map
        .iter()
        .filter_map(|entry| {
            let rows: Vec<&LogRecord> = records
                .iter()
                .filter(|r| r.vault_id == entry.vault_id)
                .collect();

            if rows.is_empty() {
                None
            } else {
                Some(VaultPartition {
                    vault_id: &entry.vault_id,
                    recipients: &entry.recipients,
                    records: rows,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(task_id: &str, vault_id: &str) -> LogRecord {
        LogRecord {
            task_id: task_id.into(),
            backup_id: None,
            task_type: "backup".into(),
            status: "success".into(),
            resource_id: None,
            resource_name: None,
            resource_type: None,
            vault_id: vault_id.into(),
            vault_name: None,
            started: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(13, 0, 0)
                .unwrap(),
            ended: None,
        }
    }

    #[test]
    fn test_only_configured_vaults_with_rows() {
        let map: VaultEmailMap = r#"{"v1": ["a@x.com"], "v2": ["b@x.com"]}"#.parse().unwrap();
        let records = vec![record("t1", "v1"), record("t2", "v3"), record("t3", "v1")];

        let partitions = group_by_vault(&records, &map);

        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].vault_id, "v1");
        assert_eq!(partitions[0].recipients, &["a@x.com".to_string()]);
        let ids: Vec<_> = partitions[0].records.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3"]);
    }

    #[test]
    fn test_partitions_follow_map_order() {
        let map: VaultEmailMap = r#"{"v2": ["b@x.com"], "v1": ["a@x.com"]}"#.parse().unwrap();
        let records = vec![record("t1", "v1"), record("t2", "v2")];

        let order: Vec<_> = group_by_vault(&records, &map)
            .iter()
            .map(|p| p.vault_id)
            .collect();
        assert_eq!(order, vec!["v2", "v1"]);
    }

    #[test]
    fn test_empty_inputs() {
        let map = VaultEmailMap::new();
        assert!(group_by_vault(&[record("t1", "v1")], &map).is_empty());

        let map: VaultEmailMap = r#"{"v1": ["a@x.com"]}"#.parse().unwrap();
        assert!(group_by_vault(&[], &map).is_empty());
    }
}
