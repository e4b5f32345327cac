//! Zabbix output tests
//!
//! Tests discovery documents, item lines and the reporter end to end against a
//! mock array.

use mockito::{Matcher, Server, ServerGuard};
use qsan_exporter::config::QsanConfig;
use qsan_exporter::qsan::types::{StatSet, StatsTable};
use qsan_exporter::qsan::QsanClient;
use qsan_exporter::zabbix::{discovery_document, entity_lines, item_line, storage_lines, Method, Reporter};
use serde_json::json;

const LOGIN_SANOS4: &str = r#"<div id="logo_writing">SANOS 4.0</div><div id="logout_btn"></div>"#;

fn stats(pairs: &[(&str, &str)]) -> StatSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn connected(server: &mut ServerGuard) -> QsanClient {
    let _login = server
        .mock("POST", "/login.php")
        .with_body(LOGIN_SANOS4)
        .create_async()
        .await;
    QsanClient::connect(QsanConfig::for_host(server.host_with_port()))
        .await
        .expect("Failed to connect")
}

async fn report(client: &QsanClient, method: Method) -> String {
    let mut reporter = Reporter::new(client, "storage-01", Vec::new());
    reporter.run(method).await.expect("Failed to report");
    String::from_utf8(reporter.into_inner()).expect("utf-8 output")
}

#[test]
fn test_discovery_document_shape() {
    // Given: Two volume names
    let names = vec!["vol-a_RAID5_1TB".to_string(), "vol-b_RAID6_2TB".to_string()];

    // When: Building the document
    let document = discovery_document("{#VOLUME}", &names).expect("Failed to serialize");

    // Then: It is the LLD shape Zabbix expects
    let value: serde_json::Value = serde_json::from_str(&document).expect("valid json");
    assert_eq!(
        value,
        json!({"data": [{"{#VOLUME}": "vol-a_RAID5_1TB"}, {"{#VOLUME}": "vol-b_RAID6_2TB"}]})
    );
    assert!(document.contains('\n'));
}

#[test]
fn test_empty_discovery_document() {
    let document = discovery_document("{#FCPORT}", &[]).expect("Failed to serialize");

    let value: serde_json::Value = serde_json::from_str(&document).expect("valid json");
    assert_eq!(value, json!({"data": []}));
}

#[test]
fn test_item_line_is_tab_separated() {
    assert_eq!(
        item_line("storage-01", "qsan.sanos4.storage.iops", "5"),
        "storage-01\tqsan.sanos4.storage.iops\t5"
    );
}

#[test]
fn test_entity_lines_use_display_names() {
    // Given: Stats for a known and an unknown volume id
    let mut table = StatsTable::new();
    table.insert("11".to_string(), stats(&[("iops", "5"), ("read", "1024")]));
    table.insert("99".to_string(), stats(&[("iops", "1")]));

    // When: Rendering with a name lookup that knows only id 11
    let lines = entity_lines("zh", "volume", &table, |id| {
        (id == "11").then(|| "vol-a_RAID5_1TB".to_string())
    });

    // Then: Known ids use their display name, unknown ids their raw id
    assert_eq!(
        lines,
        vec![
            "zh\tqsan.sanos4.volume.iops[vol-a_RAID5_1TB]\t5",
            "zh\tqsan.sanos4.volume.read[vol-a_RAID5_1TB]\t1024",
            "zh\tqsan.sanos4.volume.iops[99]\t1",
        ]
    );
}

#[test]
fn test_storage_lines() {
    let lines = storage_lines("zh", &stats(&[("iops", "7"), ("read", "0")]));

    assert_eq!(lines, vec!["zh\tqsan.sanos4.storage.iops\t7", "zh\tqsan.sanos4.storage.read\t0"]);
}

#[tokio::test]
async fn test_volume_discovery_report() {
    // Given: A client with one discovered volume
    let mut server = Server::new_async().await;
    let mut client = connected(&mut server).await;
    let _volumes = server
        .mock("GET", "/vd_x.php")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_body("<r><vd_num>1</vd_num><udv><id>1</id><name>db 01</name><raid>RAID 1</raid><capacity>200 GB</capacity></udv></r>")
        .create_async()
        .await;
    client.discover_volumes().await.expect("discovery failed");

    // When: Reporting volume discovery
    let output = report(&client, Method::DiscoveryVolume).await;

    // Then: The document carries the display name
    let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
    assert_eq!(value, json!({"data": [{"{#VOLUME}": "db-01_RAID1_200GB"}]}));
}

#[tokio::test]
async fn test_health_report() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    let _status = server
        .mock("GET", "/dashboard_x.php")
        .match_query(Matcher::Any)
        .with_body("<r><status_item><label>System Health</label><value>Failed</value></status_item></r>")
        .create_async()
        .await;

    let output = report(&client, Method::StatsHealth).await;

    assert_eq!(output, "storage-01\tqsan.sanos4.storage.healthy\t0\n");
}

#[tokio::test]
async fn test_indeterminate_health_prints_nothing() {
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    let _status = server
        .mock("GET", "/dashboard_x.php")
        .match_query(Matcher::Any)
        .with_body("<r></r>")
        .create_async()
        .await;

    let output = report(&client, Method::StatsHealth).await;

    assert!(output.is_empty());
}

#[tokio::test]
async fn test_stats_all_reports_in_order() {
    // Given: An array with no inventory but dashboard counters and good health
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    let mut _empty_pages = Vec::new();
    for cmd in ["monitor_volume", "monitor_disk", "monitor_fc", "monitor_ssd_cache"] {
        let page = server
            .mock("GET", "/monitor_x.php")
            .match_query(Matcher::UrlEncoded("cmd".into(), cmd.into()))
            .with_body("<r></r>")
            .create_async()
            .await;
        _empty_pages.push(page);
    }
    let _dashboard = server
        .mock("GET", "/monitor_x.php")
        .match_query(Matcher::UrlEncoded("cmd".into(), "monitor_dashboard".into()))
        .with_body("<r><controller/><iops>3</iops><tx>1</tx><rx>2</rx></r>")
        .create_async()
        .await;
    let _status = server
        .mock("GET", "/dashboard_x.php")
        .match_query(Matcher::Any)
        .with_body("<r><status_item><label>System Health</label><value>Good</value></status_item></r>")
        .create_async()
        .await;

    // When: Reporting everything
    let output = report(&client, Method::StatsAll).await;

    // Then: Storage lines come before the health line
    assert_eq!(
        output,
        "storage-01\tqsan.sanos4.storage.iops\t3\n\
         storage-01\tqsan.sanos4.storage.read\t1048576\n\
         storage-01\tqsan.sanos4.storage.write\t2097152\n\
         storage-01\tqsan.sanos4.storage.healthy\t1\n"
    );
}

#[tokio::test]
async fn test_report_fails_on_transport_error() {
    // Given: A stats page that errors
    let mut server = Server::new_async().await;
    let client = connected(&mut server).await;
    let _stats = server
        .mock("GET", "/monitor_x.php")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    // When: Reporting volume stats
    let mut reporter = Reporter::new(&client, "storage-01", Vec::new());
    let result = reporter.run(Method::StatsVolume).await;

    // Then: The error surfaces and nothing was written
    assert!(result.is_err_and(|e| e.is_transport()));
    assert!(reporter.into_inner().is_empty());
}

#[tokio::test]
async fn test_sanos3_keys_share_the_template_prefix() {
    // Given: A SANOS 3 array with an all-green status indicator
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/login.php")
        .with_body(r#"<img title="Logout" src="logout.png">"#)
        .create_async()
        .await;
    let client = QsanClient::connect(QsanConfig::for_host(server.host_with_port()))
        .await
        .expect("Failed to connect");
    let _status = server
        .mock("GET", "/status.php")
        .with_body(r#"<div id="status_indicator"><img src="green.png"></div>"#)
        .create_async()
        .await;

    // When: Reporting health
    let output = report(&client, Method::StatsHealth).await;

    // Then: The key uses the same prefix as on SANOS 4
    assert_eq!(output, "storage-01\tqsan.sanos4.storage.healthy\t1\n");
}
