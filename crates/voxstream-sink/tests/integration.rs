use voxstream_core::StreamingResponse;
use voxstream_sink::SinkRegistry;

fn file_config(path: &str) -> toml::Value {
    toml::Value::Table({
        let mut t = toml::map::Map::new();
        t.insert("path".to_string(), toml::Value::String(path.to_string()));
        t
    })
}

#[tokio::test]
async fn test_registry_file_sink_writes_in_render_order() {
    let dir = std::env::temp_dir().join("voxstream_sink_integ_order");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("out.jsonl");
    let _ = std::fs::remove_file(&path);

    let registry = SinkRegistry::new();
    let mut sink = registry
        .build("file", file_config(&path.to_string_lossy()))
        .await
        .unwrap();

    for text in ["first", "second", "third"] {
        sink.render(&StreamingResponse::single(text, true))
            .await
            .unwrap();
    }
    sink.shutdown().await.unwrap();

    let transcripts: Vec<String> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| {
            let r: StreamingResponse = serde_json::from_str(l).unwrap();
            r.top_transcript().unwrap().to_string()
        })
        .collect();
    assert_eq!(transcripts, vec!["first", "second", "third"]);

    std::fs::remove_dir_all(&dir).unwrap();
}
