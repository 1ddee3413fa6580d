use color_eyre::Result;
use drivetree_config::PrunePolicy;
use drivetree_core::{FileTree, Location, Node, NodeId, TreeError, TreeKey};
use drivetree_models::{File, FileId, Folder, FolderId};
use proptest::prelude::*;

const MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

fn id(name: &str) -> String {
    format!("{name:_<28}")
}

fn folder(name: &str, parents: &[&str]) -> Result<Folder> {
    let parents: Vec<String> = parents.iter().map(|p| id(p)).collect();
    Ok(Folder::create(&id(name), name, &parents, false)?)
}

fn file(name: &str, size: u64, parents: &[&str]) -> Result<File> {
    let parents: Vec<String> = parents.iter().map(|p| id(p)).collect();
    Ok(File::create(&id(name), name, "application/pdf", &parents, false, size, MD5)?)
}

fn node(tree: &FileTree, name: &str) -> NodeId {
    tree.lookup(&id(name)).unwrap_or_else(|| panic!("{name} is not in the tree"))
}

fn size(tree: &FileTree, name: &str) -> u64 {
    tree.size_of(node(tree, name))
}

fn nitems(tree: &FileTree, name: &str) -> usize {
    tree.node(node(tree, name))
        .and_then(Node::as_folder)
        .map_or(0, |f| f.nitems())
}

#[test]
fn test_single_folder_scenario() -> Result<()> {
    let mut tree = FileTree::new();
    tree.insert(folder("folderA", &[])?)?;
    tree.insert(file("f1", 100, &["folderA"])?)?;
    tree.insert(file("f2", 50, &["folderA"])?)?;

    assert_eq!(size(&tree, "folderA"), 150);
    assert_eq!(nitems(&tree, "folderA"), 2);

    let f1 = tree.node(node(&tree, "f1")).and_then(Node::as_file).map(|f| f.ancestors().to_vec());
    assert_eq!(f1, Some(vec![node(&tree, "folderA")]));

    tree.remove(id("f1"))?;
    assert_eq!(size(&tree, "folderA"), 50);
    assert_eq!(nitems(&tree, "folderA"), 1);
    Ok(())
}

#[test]
fn test_segments_do_not_aggregate() -> Result<()> {
    let mut tree = FileTree::new();
    let drive = tree.get_or_create(Location::Top, "My Drive")?;
    let docs = tree.get_or_create(Location::Node(drive), &FolderId::parse(id("docs"))?)?;
    tree.get_or_create(Location::Node(docs), &FileId::parse(id("notes"))?)?;

    // A placeholder file weighs nothing until its record arrives.
    assert_eq!(tree.size_of(drive), 0);
    tree.insert(file("notes", 42, &["docs"])?)?;
    assert_eq!(tree.size_of(docs), 42);
    assert_eq!(tree.size_of(drive), 42);

    // The docs folder is mounted, not linked, so it has no ancestors.
    assert!(tree.ancestors(docs).is_empty());
    assert_eq!(
        tree.get_or_create(Location::Node(docs), "Archive"),
        Err(TreeError::UnsupportedKeyType {
            key: "Archive".to_string(),
            container: "folder",
        })
    );
    Ok(())
}

#[test]
fn test_deep_chain_from_out_of_order_records() -> Result<()> {
    let mut tree = FileTree::new();
    tree.insert(file("leaf", 9, &["d4"])?)?;
    tree.insert(folder("d4", &["d3"])?)?;
    tree.insert(folder("d3", &["d2"])?)?;
    tree.insert(folder("d2", &["d1"])?)?;
    tree.insert(folder("d1", &[])?)?;

    for name in ["d1", "d2", "d3", "d4"] {
        assert_eq!(size(&tree, name), 9, "size of {name}");
        assert_eq!(nitems(&tree, name), 1, "nitems of {name}");
    }
    let expected: Vec<NodeId> = ["d1", "d2", "d3", "d4"].iter().map(|n| node(&tree, n)).collect();
    assert_eq!(tree.ancestors(node(&tree, "leaf")), expected.as_slice());
    assert_eq!(tree.roots(), vec![node(&tree, "d1")]);
    Ok(())
}

#[test]
fn test_prune_policies_differ_only_for_multi_parent_items() -> Result<()> {
    for policy in [PrunePolicy::AllParents, PrunePolicy::LastParent] {
        let mut tree = FileTree::with_prune_policy(policy);
        tree.insert(folder("root", &[])?)?;
        tree.insert(folder("left", &["root"])?)?;
        tree.insert(folder("right", &["root"])?)?;
        tree.insert(file("both", 11, &["left", "right"])?)?;
        tree.insert(folder("solo", &["root"])?)?;
        tree.insert(file("single", 4, &["solo"])?)?;
        assert_eq!(size(&tree, "root"), 15);

        // Single parent: both policies prune it.
        let removal = tree.remove(id("single"))?;
        assert_eq!(removal.pruned.len(), 1, "{policy}");
        assert!(tree.lookup(&id("solo")).is_none());

        let removal = tree.remove(id("both"))?;
        let expected = match policy {
            PrunePolicy::AllParents => 2,
            PrunePolicy::LastParent => 1,
        };
        assert_eq!(removal.pruned.len(), expected, "{policy}");
        assert_eq!(size(&tree, "root"), 0, "{policy}");
        assert_eq!(nitems(&tree, "root"), 2 - expected, "{policy}");
        assert!(tree.lookup(&id("right")).is_none(), "{policy}");
    }
    Ok(())
}

#[test]
fn test_remove_entry_at_top_level() -> Result<()> {
    let mut tree = FileTree::new();
    tree.insert(folder("docs", &[])?)?;
    tree.insert(file("a", 5, &["docs"])?)?;
    let key = TreeKey::from(&FolderId::parse(id("docs"))?);
    tree.get_or_create(Location::Top, key.clone())?;

    let removal = tree.remove_entry(Location::Top, key)?;
    assert_eq!(removal.removed.len(), 2);
    assert!(tree.is_empty());
    assert!(matches!(
        tree.remove_entry(Location::Top, "nothing"),
        Err(TreeError::NotFound(_))
    ));
    Ok(())
}

#[derive(Debug, Clone)]
struct Layout {
    /// Parent indices (into the folder list) of each folder; always lower, so no cycles.
    folders: Vec<Vec<usize>>,
    /// (size, parent indices) of each file.
    files: Vec<(u64, Vec<usize>)>,
}

fn layout() -> impl Strategy<Value = Layout> {
    (1usize..8).prop_flat_map(|n| {
        let folders = (0..n)
            .map(|i| {
                if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    proptest::collection::vec(0..i, 0..3).boxed()
                }
            })
            .collect::<Vec<_>>();
        let files = proptest::collection::vec((0u64..1000, proptest::collection::vec(0..n, 0..3)), 0..12);
        (folders, files).prop_map(|(folders, files)| Layout { folders, files })
    })
}

fn records(layout: &Layout) -> Result<Vec<drivetree_models::Item>> {
    let mut items = Vec::new();
    for (i, parents) in layout.folders.iter().enumerate() {
        let parents: Vec<String> = parents.iter().map(|p| format!("dir{p}")).collect();
        let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
        items.push(folder(&format!("dir{i}"), &parents)?.into());
    }
    for (i, (bytes, parents)) in layout.files.iter().enumerate() {
        let parents: Vec<String> = parents.iter().map(|p| format!("dir{p}")).collect();
        let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
        items.push(file(&format!("file{i}"), *bytes, &parents)?.into());
    }
    Ok(items)
}

/// Recomputes a folder size by walking down and counting each file once.
fn expected_size(tree: &FileTree, folder: NodeId) -> u64 {
    let mut seen = std::collections::HashSet::new();
    let mut stack = vec![folder];
    let mut total = 0;
    while let Some(current) = stack.pop() {
        for (_, child) in tree.children(Location::Node(current)) {
            if !seen.insert(child) {
                continue;
            }
            match tree.node(child) {
                Some(Node::File(f)) => total += f.size(),
                Some(Node::Folder(_)) => stack.push(child),
                _ => {}
            }
        }
    }
    total
}

proptest! {
    #[test]
    fn prop_sizes_do_not_depend_on_order(layout in layout(), seed in any::<u64>()) {
        let items = records(&layout).unwrap();
        let mut shuffled = items.clone();
        // Cheap deterministic shuffle.
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            #[allow(clippy::cast_possible_truncation)]
            let j = (state % (i as u64 + 1)) as usize;
            shuffled.swap(i, j);
        }

        let mut ordered = FileTree::new();
        for item in items {
            ordered.insert(item).unwrap();
        }
        let mut random = FileTree::new();
        for item in shuffled {
            random.insert(item).unwrap();
        }

        for i in 0..layout.folders.len() {
            let name = id(&format!("dir{i}"));
            let a = ordered.lookup(&name).unwrap();
            let b = random.lookup(&name).unwrap();
            prop_assert_eq!(ordered.size_of(a), random.size_of(b));
            prop_assert_eq!(ordered.size_of(a), expected_size(&ordered, a));
        }
    }

    #[test]
    fn prop_removing_every_file_empties_every_folder(layout in layout()) {
        let mut tree = FileTree::new();
        for item in records(&layout).unwrap() {
            tree.insert(item).unwrap();
        }
        for i in 0..layout.files.len() {
            let name = id(&format!("file{i}"));
            if tree.lookup(&name).is_some() {
                tree.remove(&name).unwrap();
            }
        }
        for (_, node) in tree.items() {
            prop_assert!(!matches!(node, Node::File(_)));
            if let Node::Folder(f) = node {
                prop_assert_eq!(f.size(), 0);
            }
        }
    }
}
