//! Cycle Layout Demo
//!
//! Embeds an 8-node cycle into 2 dimensions and prints the fitted layout.
//!
//! ```bash
//! cargo run --example cycle_layout
//! ```

use trellis::{graph, CauchySimilarity, Embedding, FitOptions};

fn main() -> trellis::Result<()> {
    println!("Cycle Layout Demo");
    println!("=================\n");

    let nodes = 8;
    let a = graph::cycle_adjacency(nodes);
    println!("Graph: {}-node cycle, edges {:?}", nodes, graph::edge_list(&a));

    let mut embedding = Embedding::new(nodes, 2, CauchySimilarity)?;
    let initial = embedding.loss_value(&a, true)?;

    let options = FitOptions::default().with_verbose(false);
    embedding.fit(&a, &options)?;
    let fitted = embedding.loss_value(&a, true)?;

    println!("\nLoss: {:.4} -> {:.4} after {} iterations", initial, fitted, options.iterations);

    println!("\nFitted coordinates:");
    println!("Node |      x |      y");
    println!("-----|--------|-------");
    let coords = embedding.coordinates();
    for i in 0..nodes {
        println!("{:4} | {:6.3} | {:6.3}", i, coords[[i, 0]], coords[[i, 1]]);
    }

    // Compare embedded distances along edges vs across the cycle
    let dist = |i: usize, j: usize| -> f32 {
        let dx = coords[[i, 0]] - coords[[j, 0]];
        let dy = coords[[i, 1]] - coords[[j, 1]];
        (dx * dx + dy * dy).sqrt()
    };

    let edge_mean: f32 = (0..nodes).map(|i| dist(i, (i + 1) % nodes)).sum::<f32>() / nodes as f32;
    let opposite_mean: f32 =
        (0..nodes).map(|i| dist(i, (i + nodes / 2) % nodes)).sum::<f32>() / nodes as f32;

    println!("\nMean distance along cycle edges:   {:.3}", edge_mean);
    println!("Mean distance to opposite nodes:   {:.3}", opposite_mean);
    println!("\nInterpretation:");
    println!("- Connected nodes sit close together; opposite nodes are pushed apart");
    println!("- The layout approximates a ring, the natural drawing of a cycle");

    println!("\nDone!");
    Ok(())
}
