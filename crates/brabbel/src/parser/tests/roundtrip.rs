use super::parse;

// -----------------------------------------------------------------------
// Rendering a tree and re-parsing it yields the same tree
// -----------------------------------------------------------------------

const CORPUS: &[&str] = &[
    "$field=='string'",
    "$field!=3.2",
    "$field>4",
    "$field<$field",
    "$field in [ 1,2,3 ]",
    "len($field)>=3",
    "bool($field)",
    "bool($age) and $age >= 18",
    "$a and $b or $c + 1",
    "not $a * -$b",
    "-2 ^ 2 ^ $x",
    "-(5)",
    "$a - -5",
    "$a eq 'x' or $b ne \"it's\"",
    "len([]) == 0",
    "[1.5, -2, 'a', [$b]]",
    "$x / 1e3 > 0.001",
    "(-$x) ^ 2",
    "not (not $x)",
];

#[test]
fn rendered_tree_reparses_to_itself() {
    for input in CORPUS {
        let tree = parse(input).unwrap();
        let rendered = tree.to_string();
        let reparsed = parse(&rendered)
            .unwrap_or_else(|e| panic!("{input:?} rendered as {rendered:?} failed: {e}"));
        assert_eq!(reparsed, tree, "{input:?} rendered as {rendered:?}");
    }
}

#[test]
fn rendering_uses_symbolic_operators() {
    let tree = parse("$a eq 1 and $b plus 2").unwrap();
    assert_eq!(tree.to_string(), "((($a == 1) and $b) + 2)");
}
