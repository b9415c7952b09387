//! Simple Session Example
//!
//! Opens a database on a running OrientDB server, lists its classes, runs a
//! query and disconnects.
//!
//! Run with: cargo run --example simple_session

use orientdb_rs::DatabaseClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Simple OrientDB REST Example\n");

    let mut client = DatabaseClient::new("http://localhost:2480/demo")?;
    client.open_with_credentials("admin", "admin").await?;
    println!("✅ Connected to {}\n", client.database_name());

    if let Some(classes) = client.schema()? {
        let names: Vec<&str> = classes
            .as_array()
            .map(|list| list.iter().filter_map(|c| c["name"].as_str()).collect())
            .unwrap_or_default();
        println!("📚 Classes: {}", names.join(", "));
    }

    // Limit to 5 records, fetch linked records one level deep
    let result = client
        .query_with("select from OUser", Some("5"), Some("*:1"))
        .await?;
    println!("🔍 Query result:\n{}\n", result.to_pretty_string());

    client.close().await?;
    println!("👋 Disconnected");

    Ok(())
}
