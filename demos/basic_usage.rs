//! Basic usage example for the Multinetics Search library.
//!
//! Builds a small catalog, runs a debounced query through the pipeline,
//! narrows it with a filter and prints highlighted matches.

use multinetics_search::engine::highlight::{annotate_result, to_html};
use multinetics_search::engine::insights::{stats, suggestions};
use multinetics_search::engine::{Corpus, FilterKey, FilterSet, Matcher, QueryPipeline};
use multinetics_search::models::{FieldRef, RecordBuilder, ResultSet};
use multinetics_search::ui::{format_results_cards, paint_segments};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus = Corpus::load(vec![
        RecordBuilder::new("a1", "Deep Learning for Networks")
            .authors(["Kim Soo-ah", "Daniel Lee"])
            .abstract_text("Convolutional models classify network traffic in real time.")
            .keywords(["AI", "Networks", "Traffic"])
            .year(2020)
            .volume(9)
            .issue(2)
            .build(),
        RecordBuilder::new("a2", "Shallow Parsing of Sensor Logs")
            .authors(["Amaka Obi"])
            .keywords(["IoT", "Parsing"])
            .year(2019)
            .volume(8)
            .issue(1)
            .build(),
        RecordBuilder::new("a3", "Secure Mesh Networks for IoT")
            .authors(["Chen Li"])
            .keywords(["IoT", "Security", "networks"])
            .year(2021)
            .volume(9)
            .issue(1)
            .build(),
    ])?;

    let summary = stats(&corpus);
    println!(
        "Loaded {} articles spanning {} years, {} topics",
        summary.articles, summary.year_span, summary.topics
    );
    println!("Try searching for: {}\n", suggestions(&corpus, 3).join(", "));

    let pipeline = QueryPipeline::new(
        corpus,
        Matcher::from_name("similarity"),
        FilterSet::new([FilterKey::Volume, FilterKey::Issue]),
    )
    .with_debounce(Duration::from_millis(150));

    pipeline.subscribe(|results: &ResultSet| {
        println!("-> {} result(s) for {:?}", results.len(), results.query);
    });

    // Simulate typing: only the last keystroke is searched.
    for partial in ["n", "ne", "net", "netw", "network"] {
        pipeline.set_query(partial);
        tokio::time::sleep(Duration::from_millis(40)).await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Filters apply immediately.
    pipeline.set_filter("volume", Some(9.into()))?;
    pipeline.set_filter("issue", Some(1.into()))?;

    let results = pipeline.get_results();
    print!("\n{}", format_results_cards(&results, 100, true, false));

    if let Some(top) = results.results.first() {
        if let Some(segments) = annotate_result(top, FieldRef::title()) {
            println!("Title as HTML: {}", to_html(&segments));
            println!("Title plain:   {}", paint_segments(&segments, false));
        }
    }

    println!("Searches run: {}", pipeline.search_count());
    Ok(())
}
