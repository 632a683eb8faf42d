use tab_vault::backup::{MAX_BACKUPS, merge_backups, record_backup, sync_backups};
use tab_vault::export::{ExportFormat, export_tabs};
use tab_vault::grouping::{GroupColor, color_for};
use tab_vault::storage::{self, BACKUP_DATA_KEY, MemoryStore, TAB_BACKUPS_KEY};
use tab_vault::tab_data::{Snapshot, TabInfo, TabRecord};

fn tabs(urls: &[&str]) -> Vec<TabInfo> {
    urls.iter()
        .enumerate()
        .map(|(i, url)| TabInfo::new(i as i32 + 1, url.to_string(), format!("Tab {}", i), 1))
        .collect()
}

async fn history(store: &MemoryStore, key: &str) -> Vec<Snapshot> {
    storage::load(store, key).await.unwrap()
}

#[tokio::test(flavor = "current_thread")]
async fn hourly_backups_keep_the_ten_newest() {
    let local = MemoryStore::new();
    let open = tabs(&["https://www.rust-lang.org", "https://docs.rs", "https://docs.rs/serde"]);

    for hour in 0..15 {
        record_backup(&local, &open, hour * 3_600_000).await.unwrap();
    }

    let kept = history(&local, TAB_BACKUPS_KEY).await;
    assert_eq!(kept.len(), MAX_BACKUPS);
    assert_eq!(kept[0].timestamp, 14 * 3_600_000);
    assert_eq!(kept[9].timestamp, 5 * 3_600_000);
    assert!(kept.windows(2).all(|pair| pair[0].timestamp > pair[1].timestamp));
    assert_eq!(kept[0].stats.most_active_domain, "docs.rs");
    assert_eq!(kept[0].stats.unique_domains, 2);
}

#[tokio::test(flavor = "current_thread")]
async fn two_browsers_converge_after_syncing() {
    let remote = MemoryStore::new();
    let laptop = MemoryStore::new();
    let desktop = MemoryStore::new();

    record_backup(&laptop, &tabs(&["https://a.com"]), 1_000).await.unwrap();
    record_backup(&desktop, &tabs(&["https://b.com"]), 2_000).await.unwrap();

    sync_backups(&laptop, &remote).await.unwrap();
    sync_backups(&desktop, &remote).await.unwrap();
    sync_backups(&laptop, &remote).await.unwrap();

    let expected = vec![2_000, 1_000];
    for (store, key) in [(&laptop, TAB_BACKUPS_KEY), (&desktop, TAB_BACKUPS_KEY), (&remote, BACKUP_DATA_KEY)] {
        let stamps: Vec<i64> = history(store, key).await.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, expected);
    }
}

#[test]
fn merge_output_is_capped_sorted_and_unique() {
    let make = |t: i64| Snapshot {
        timestamp: t,
        tabs: Vec::new(),
        stats: tab_vault::backup::snapshot_stats(&[]),
    };
    let first: Vec<Snapshot> = [3, 17, 8, 12, 1, 5, 9].into_iter().map(make).collect();
    let second: Vec<Snapshot> = [12, 4, 20, 8, 2, 19].into_iter().map(make).collect();

    let merged = merge_backups(&first, &second);

    let stamps: Vec<i64> = merged.iter().map(|s| s.timestamp).collect();
    assert_eq!(stamps, vec![20, 19, 17, 12, 9, 8, 5, 4, 3, 2]);
}

#[test]
fn group_colors_are_stable() {
    assert_eq!(color_for(""), GroupColor::Blue);
    assert_eq!(color_for("github.com"), color_for("github.com"));
}

#[test]
fn exports_escape_titles() {
    let records = vec![TabRecord {
        title: "Rust | \"The Book\"".to_string(),
        url: "https://doc.rust-lang.org/book/".to_string(),
        domain: "doc.rust-lang.org".to_string(),
        timestamp: 0,
    }];

    let markdown = export_tabs(ExportFormat::Markdown, &records).unwrap();
    assert!(markdown.content.contains("Rust \\| \"The Book\""));

    let csv_file = export_tabs(ExportFormat::Csv, &records).unwrap();
    let mut reader = csv::Reader::from_reader(csv_file.content.as_bytes());
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(&row[0], "Rust | \"The Book\"");
}
