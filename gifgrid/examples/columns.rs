// Example: column counts across container widths, and stable round-robin placement.
use gifgrid::{ColumnBuckets, ColumnLayout, ColumnSync, LayoutOptions};

fn main() {
    let mut layout = ColumnLayout::new(LayoutOptions::responsive());
    for width in [0, 320, 480, 767, 768, 1024, 1600] {
        layout.set_width(width);
        println!(
            "width={width} columns={} column_width={}",
            layout.column_count(),
            layout.column_width()
        );
    }

    // Appending items only pushes onto the existing columns.
    layout.set_width(480);
    let mut buckets = ColumnBuckets::new();
    for len in [20, 40, 45] {
        let sync = buckets.sync(len, layout.column_count());
        println!("len={len} sync={sync:?} heads={:?}", first_of_each(&buckets));
    }

    // A width change that alters the column count reshuffles everything.
    layout.set_width(1024);
    let sync = buckets.sync(45, layout.column_count());
    assert_eq!(sync, ColumnSync::Rebuilt);
    println!("after resize: columns={} heads={:?}", buckets.column_count(), first_of_each(&buckets));
}

fn first_of_each(buckets: &ColumnBuckets) -> Vec<Option<usize>> {
    buckets.buckets().iter().map(|b| b.first().copied()).collect()
}
