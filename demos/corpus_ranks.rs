//! Rank a small in-memory corpus with both estimators and print the results.
//!
//! Link extraction is out of scope for the library, so the corpus is written out by
//! hand: each page with the pages it links to. Run with `RUST_LOG=linkrank=debug`
//! to see the estimators' events.

use linkrank::{LinkGraph, PageRankConfig, RankDistribution, SamplerConfig};
use tracing_subscriber::EnvFilter;

fn print_ranks(title: &str, ranks: &RankDistribution) {
    println!("{title}");
    for (page, rank) in ranks {
        println!("  {page}: {rank:.4}");
    }
}

fn main() -> Result<(), linkrank::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let corpus = [
        ("bfs.html", vec!["search.html"]),
        ("dfs.html", vec!["bfs.html", "search.html"]),
        ("games.html", vec!["tictactoe.html", "minesweeper.html"]),
        ("minesweeper.html", vec!["games.html"]),
        ("minimax.html", vec!["games.html", "search.html"]),
        ("search.html", vec!["dfs.html", "bfs.html", "minimax.html", "games.html"]),
        ("tictactoe.html", vec!["games.html", "minimax.html"]),
        // Link to a page outside the corpus: dropped when the graph is built.
        ("about.html", vec!["https://example.com/"]),
    ];
    let graph: LinkGraph = LinkGraph::from_links(
        corpus
            .into_iter()
            .map(|(page, links)| (page.to_string(), links.into_iter().map(str::to_string))),
    );

    let sampler = SamplerConfig::default();
    let sampled = graph.sample_pagerank(&sampler)?;
    print_ranks(&format!("PageRank Results from Sampling (n = {})", sampler.samples), &sampled);

    let (iterated, run) = graph.iterate_pagerank_run(&PageRankConfig::default())?;
    print_ranks(&format!("PageRank Results from Iteration ({} sweeps)", run.iterations), &iterated);

    println!("max |sampled - iterated| = {:.4}", sampled.max_abs_diff(&iterated));
    Ok(())
}
