use graph_data::{EdgeIndex, EdgeSplits, LinkDataset, TransactionGraph};

/// Two 4-node communities; links exist inside a community, never across.
pub fn community_dataset() -> LinkDataset {
    let rows: Vec<Vec<f32>> = (0..8)
        .map(|i| {
            let community = (i / 4) as f32;
            vec![1.0 - community, community, (i % 4) as f32 * 0.25, 0.5]
        })
        .collect();
    let mut src = Vec::new();
    let mut dst = Vec::new();
    for base in [0i64, 4] {
        for k in 0..4 {
            let (a, b) = (base + k, base + (k + 1) % 4);
            src.extend([a, b]);
            dst.extend([b, a]);
        }
    }
    let graph = TransactionGraph::from_rows(src, dst, rows).expect("valid graph");
    let splits = EdgeSplits {
        train_pos: EdgeIndex::from_pairs(&[(0, 1), (1, 2), (4, 5), (5, 6), (0, 2), (4, 6)]),
        train_neg: EdgeIndex::from_pairs(&[(0, 4), (1, 5), (2, 6), (3, 7), (0, 6), (5, 1)]),
        val_pos: EdgeIndex::from_pairs(&[(2, 3), (6, 7)]),
        val_neg: EdgeIndex::from_pairs(&[(2, 7), (6, 3)]),
        test_pos: EdgeIndex::from_pairs(&[(3, 0), (7, 4), (1, 3)]),
        test_neg: EdgeIndex::from_pairs(&[(3, 4), (7, 0), (1, 6)]),
    };
    LinkDataset { graph, splits }
}
