#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use crate::error::Error;
    use crate::grid::{Loc, RectGrid};
    use crate::parser::{self, FieldParser, Token};
    use crate::puzzle::Puzzle;
    use crate::symbol::{builtins, Symbol, SymbolKind, SymbolTable};
    use crate::value::Value;
    use crate::{load_from_text, Rule};

    fn atom(s: &str) -> Token {
        Token::Atom(s.to_string())
    }

    fn load_one(text: &str) -> Puzzle {
        let mut puzzles = load_from_text(text, builtins()).unwrap();
        assert_eq!(puzzles.len(), 1);
        puzzles.remove(0)
    }

    fn grid_3x3() -> RectGrid {
        RectGrid::new(NonZero::new(3).unwrap(), NonZero::new(3).unwrap())
    }

    #[test]
    fn symbol_identity_is_short_name() {
        assert_eq!(
            Symbol::colored("WH"),
            builtins().lookup("WH").unwrap().clone()
        );
        assert_eq!(Symbol::number(4), Symbol::number(4));
        assert_ne!(Symbol::colored("WH"), Symbol::colored("BK"));
        // kind does not participate, only the short name does
        assert_eq!(Symbol::colored("4"), Symbol::number(4));
    }

    #[test]
    fn builtin_table_contents() {
        let table = builtins();
        assert_eq!(table.lookup("_").unwrap().kind(), SymbolKind::Empty);
        assert_eq!(table.lookup("30").unwrap().numeric_value(), Some(30));
        assert!(table.lookup("31").is_err());

        let err = table.lookup("nope").unwrap_err();
        assert!(format!("{err}").contains("nope"));
    }

    #[test]
    fn registry_overwrites_silently() {
        let mut table = SymbolTable::builtin();
        table.register(Symbol::colored("5"));
        assert_eq!(table.lookup("5").unwrap().kind(), SymbolKind::Colored);
    }

    #[test]
    fn adjacency_symmetric_irreflexive() {
        let grid = RectGrid::new(NonZero::new(3).unwrap(), NonZero::new(4).unwrap());
        for a in grid.vertices() {
            assert!(!grid.adjacent(a.loc(), a.loc()));
            for b in grid.vertices() {
                assert_eq!(
                    grid.adjacent(a.loc(), b.loc()),
                    grid.adjacent(b.loc(), a.loc())
                );
            }
        }
        assert!(grid.adjacent(Loc(0, 0), Loc(0, 1)));
        assert!(grid.adjacent(Loc(0, 0), Loc(1, 0)));
        assert!(!grid.adjacent(Loc(0, 0), Loc(1, 1)));
        assert!(!grid.adjacent(Loc(0, 0), Loc(0, 2)));
    }

    #[test]
    fn neighbor_counts() {
        let grid = grid_3x3();
        assert_eq!(grid.neighbors(Loc(0, 0)).len(), 2);
        assert_eq!(grid.neighbors(Loc(0, 1)).len(), 3);
        assert_eq!(grid.neighbors(Loc(1, 1)).len(), 4);
    }

    #[test]
    fn region_empty_without_symbol_on_seed() {
        let mut grid = grid_3x3();
        let black = Symbol::colored("BK");
        grid.add_symbol(0, 1, black.clone());
        assert!(grid.region(Loc(0, 0), &black).is_empty());
    }

    #[test]
    fn region_is_bfs_discovery_order() {
        let mut grid = RectGrid::new(NonZero::new(1).unwrap(), NonZero::new(3).unwrap());
        let black = Symbol::colored("BK");
        for col in 0..3 {
            grid.add_symbol(0, col, black.clone());
        }
        assert_eq!(
            grid.region(Loc(0, 0), &black),
            vec![Loc(0, 0), Loc(0, 1), Loc(0, 2)]
        );
    }

    #[test]
    fn region_respects_connectivity() {
        let mut grid = grid_3x3();
        let black = Symbol::colored("BK");
        // a plus sign; the corners stay white
        for (row, col) in [(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)] {
            grid.add_symbol(row, col, black.clone());
        }
        grid.add_symbol(0, 0, Symbol::colored("WH"));

        let region = grid.region(Loc(1, 1), &black);
        assert_eq!(region.len(), 5);
        assert!(!region.contains(&Loc(0, 0)));

        // diagonal contact alone does not connect
        let mut grid = grid_3x3();
        grid.add_symbol(0, 0, black.clone());
        grid.add_symbol(1, 1, black.clone());
        assert_eq!(grid.region(Loc(0, 0), &black), vec![Loc(0, 0)]);
    }

    #[test]
    fn vertex_symbols_keep_order_and_duplicates() {
        let mut grid = grid_3x3();
        let symbols = vec![Symbol::colored("WH"), Symbol::colored("WH")];
        grid.replace_symbols(1, 2, &symbols);
        assert_eq!(grid.get(1, 2).symbols(), symbols.as_slice());
        assert_eq!(grid.get(1, 2).symbols_str(), "WH-WH");
    }

    #[test]
    fn tokenize_braces_and_whitespace() {
        assert_eq!(
            parser::raw_tokens("(3) \n(t urt\t (le))"),
            vec!["(", "3", ")", "(", "t", "urt", "(", "le", ")", ")"]
        );
    }

    #[test]
    fn tokenize_comments() {
        assert_eq!(parser::raw_tokens("a % b c\nd"), vec!["a", "d"]);
    }

    #[test]
    fn nesting_splices_brace_spans() {
        let nested = parser::nested_tokens("(3) \n(t urt\t (le))").unwrap();
        assert_eq!(
            nested,
            vec![
                Token::Group(vec![atom("3")]),
                Token::Group(vec![atom("t"), atom("urt"), Token::Group(vec![atom("le")])]),
            ]
        );
    }

    #[test]
    fn nesting_rejects_unmatched_braces() {
        assert!(matches!(
            parser::nested_tokens("a ) b"),
            Err(Error::UnmatchedCloseBrace { index: 1 })
        ));
        assert!(matches!(
            parser::nested_tokens("( a"),
            Err(Error::UnmatchedOpenBrace)
        ));
    }

    #[test]
    fn state_parser_splits_and_drops_empties() {
        let state = FieldParser::State;
        assert_eq!(
            state.parse_single(&atom("WH-BK-4")).unwrap(),
            Value::List(vec![
                Value::Str(String::from("WH")),
                Value::Str(String::from("BK")),
                Value::Str(String::from("4")),
            ])
        );
        assert_eq!(state.parse_single(&atom("_")).unwrap(), Value::List(vec![]));
        assert!(matches!(
            state.parse_single(&Token::Group(vec![atom("WH")])),
            Err(Error::NestedState)
        ));
    }

    #[test]
    fn dict_parser_implicit_keys_and_coercion() {
        let dict = FieldParser::Dict {
            default: Box::new(FieldParser::Base),
            custom: vec![],
        };
        let parsed = dict
            .parse(&[
                atom("-nums"),
                Token::Group(vec![atom("six"), atom("6")]),
                Token::Group(vec![atom("8"), atom("ate")]),
            ])
            .unwrap();

        let map = parsed.as_dict().unwrap();
        assert_eq!(map["type"], Value::Str(String::from("nums")));
        assert_eq!(map["six"], Value::Int(6));
        assert_eq!(map["8"], Value::Str(String::from("ate")));
    }

    #[test]
    fn dict_parser_rejects_malformed_entries() {
        let dict = FieldParser::Dict {
            default: Box::new(FieldParser::Base),
            custom: vec![],
        };
        assert!(matches!(
            dict.parse(&[atom("nums")]),
            Err(Error::MissingImplicitKey(_))
        ));
        assert!(matches!(
            dict.parse(&[Token::Group(vec![atom("lonely")])]),
            Err(Error::BadAssignment)
        ));
    }

    #[test]
    fn flag_dispatch_errors() {
        assert!(matches!(
            parser::parse_puzzle(&[atom("a"), atom("b")]),
            Err(Error::NoFlags)
        ));
        let err = parser::parse_puzzle(&[atom("--bogus")]).unwrap_err();
        assert!(matches!(err, Error::UnknownFlag(ref flag) if flag == "--bogus"));
    }

    #[test]
    fn flags_are_case_insensitive() {
        let puzzle = load_one("( --GRID -rectgrid (height 2) (width 2) )");
        assert_eq!(puzzle.grid().height(), 2);
        assert_eq!(puzzle.grid().width(), 2);
    }

    #[test]
    fn vertices_seed_positionally_with_default() {
        let puzzle = load_one(
            "( --grid -rectgrid (height 1) (width 3)
               --vertices ((data _ WH-2 BK)) )",
        );
        assert_eq!(puzzle.grid().get(0, 0).symbols_str(), "_");
        assert_eq!(puzzle.grid().get(0, 1).symbols_str(), "WH-2");
        assert_eq!(puzzle.grid().get(0, 2).symbols_str(), "BK");
        assert_eq!(puzzle.grid().get(0, 1).symbols()[1].numeric_value(), Some(2));
    }

    #[test]
    fn vertices_accept_explicit_encoding() {
        let puzzle = load_one(
            "( --grid -rectgrid (height 1) (width 2)
               --vertices (data WH BK) (encoding full) )",
        );
        assert_eq!(puzzle.grid().get(0, 0).symbols_str(), "WH");
        assert_eq!(puzzle.grid().get(0, 1).symbols_str(), "BK");
    }

    #[test]
    fn construction_errors_name_the_offender() {
        let table = builtins();

        assert!(matches!(
            load_from_text("( --vertices ((data _)) )", table),
            Err(Error::MissingGrid)
        ));

        let err = load_from_text("( --grid -hexgrid (height 2) (width 2) )", table).unwrap_err();
        assert!(matches!(err, Error::UnknownGridType(ref name) if name == "hexgrid"));

        let err = load_from_text(
            "( --grid -rectgrid (height 1) (width 1) --rules (-chess) )",
            table,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownRuleType(ref name) if name == "chess"));

        let err = load_from_text(
            "( --grid -rectgrid (height 1) (width 1) --vertices ((data ZZ)) )",
            table,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol(ref name) if name == "ZZ"));

        let err = load_from_text(
            "( --grid -rectgrid (height 1) (width 2)
               --vertices (data WH BK) (encoding sparse) )",
            table,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownEncoding(ref name) if name == "sparse"));

        assert!(matches!(
            load_from_text(
                "( --grid -rectgrid (height 2) (width 2) --vertices ((data WH BK)) )",
                table,
            ),
            Err(Error::VertexCountMismatch { got: 2, want: 4 })
        ));

        assert!(matches!(
            load_from_text(
                "( --grid -rectgrid (height 1) (width 1) --editlayers (-toggle) )",
                table,
            ),
            Err(Error::EmptyEditLayer)
        ));
    }

    #[test]
    fn no_two_by_two_square() {
        let passing = load_one(
            "( --grid -rectgrid (height 3) (width 3)
               --vertices ((data BK WH BK  BK BK WH  BK WH WH))
               --rules (-notwobytwosquare (symbol BK)) )",
        );
        assert!(passing.check().passed);

        let failing = load_one(
            "( --grid -rectgrid (height 3) (width 3)
               --vertices ((data BK BK WH  BK BK WH  WH WH WH))
               --rules (-notwobytwosquare (symbol BK)) )",
        );
        let verdict = failing.check();
        assert!(!verdict.passed);
        assert!(verdict.diagnostic.contains("(0, 0)"));
    }

    #[test]
    fn no_two_by_two_square_trivial_grids() {
        // nothing placed at all
        let empty = load_one(
            "( --grid -rectgrid (height 3) (width 3)
               --rules (-notwobytwosquare (symbol BK)) )",
        );
        assert!(empty.check().passed);

        // too small to hold a square
        let single = load_one(
            "( --grid -rectgrid (height 1) (width 1)
               --vertices ((data BK))
               --rules (-notwobytwosquare (symbol BK)) )",
        );
        assert!(single.check().passed);
    }

    #[test]
    fn single_connected_region() {
        let passing = load_one(
            "( --grid -rectgrid (height 3) (width 3)
               --vertices ((data BK WH BK  BK WH BK  BK BK BK))
               --rules (-singleconnectedregion (symbol BK)) )",
        );
        assert!(passing.check().passed);

        let failing = load_one(
            "( --grid -rectgrid (height 3) (width 3)
               --vertices ((data BK WH BK  BK WH BK  BK WH BK))
               --rules (-singleconnectedregion (symbol BK)) )",
        );
        let verdict = failing.check();
        assert!(!verdict.passed);
        assert!(verdict
            .diagnostic
            .contains("not part of a singular connected region"));

        // zero occurrences pass trivially
        let vacuous = load_one(
            "( --grid -rectgrid (height 2) (width 2)
               --vertices ((data WH WH WH WH))
               --rules (-singleconnectedregion (symbol BK)) )",
        );
        assert!(vacuous.check().passed);
    }

    #[test]
    fn implicates() {
        let passing = load_one(
            "( --grid -rectgrid (height 1) (width 2)
               --vertices ((data 1-WH WH))
               --rules (-implicates (subset 1) (superset WH)) )",
        );
        assert!(passing.check().passed);

        let failing = load_one(
            "( --grid -rectgrid (height 1) (width 2)
               --vertices ((data 1-BK WH))
               --rules (-implicates (subset 1) (superset WH)) )",
        );
        let verdict = failing.check();
        assert!(!verdict.passed);
        assert!(verdict.diagnostic.contains("must contain one of"));
    }

    #[test]
    fn region_sizes_equal_numbers() {
        let passing = load_one(
            "( --grid -rectgrid (height 1) (width 3)
               --vertices ((data 3-WH WH WH))
               --rules (-regionsizesequalnumbers (symbol WH)) )",
        );
        assert!(passing.check().passed);

        let wrong_size = load_one(
            "( --grid -rectgrid (height 1) (width 3)
               --vertices ((data 2-WH WH WH))
               --rules (-regionsizesequalnumbers (symbol WH)) )",
        );
        let verdict = wrong_size.check();
        assert!(!verdict.passed);
        assert!(verdict.diagnostic.contains("incorrect region size"));

        let two_numbers = load_one(
            "( --grid -rectgrid (height 1) (width 3)
               --vertices ((data 3-WH 1-WH WH))
               --rules (-regionsizesequalnumbers (symbol WH)) )",
        );
        let verdict = two_numbers.check();
        assert!(!verdict.passed);
        assert!(verdict.diagnostic.contains("more than one number"));

        let unnumbered = load_one(
            "( --grid -rectgrid (height 1) (width 3)
               --vertices ((data 1-WH BK WH))
               --rules (-regionsizesequalnumbers (symbol WH)) )",
        );
        let verdict = unnumbered.check();
        assert!(!verdict.passed);
        assert!(verdict.diagnostic.contains("region without a number"));
    }

    #[test]
    fn nurikabe_composite() {
        let solved = load_one(
            "( --grid -rectgrid (height 3) (width 3)
               --vertices ((data 2-WH WH BK  BK BK BK  1-WH BK 1-WH))
               --rules (-nurikabe) )",
        );
        let verdict = solved.check();
        assert!(verdict.passed, "{}", verdict.diagnostic);

        let broken = load_one(
            "( --grid -rectgrid (height 3) (width 3)
               --vertices ((data 2-WH WH BK  WH BK BK  1-WH BK 1-WH))
               --rules (-nurikabe) )",
        );
        let verdict = broken.check();
        assert!(!verdict.passed);
        // every sub-rule reports, pass or fail, with no short-circuit
        assert_eq!(verdict.diagnostic.lines().count(), 4);
        assert!(verdict.diagnostic.contains("incorrect region size"));
    }

    #[test]
    fn edit_layers_seed_defaults_after_raw_snapshot() {
        let puzzle = load_one(
            "( --grid -rectgrid (height 1) (width 3)
               --vertices ((data _ WH BK))
               --editlayers (-toggle (symbols WH BK)) )",
        );

        assert_eq!(puzzle.editlayers().len(), 1);
        assert_eq!(puzzle.editlayers()[0].mode(), "toggle");

        // the layer's first symbol lands at the front of the bare vertex
        assert_eq!(puzzle.grid().get(0, 0).symbols_str(), "WH-_");
        assert_eq!(puzzle.grid().get(0, 1).symbols_str(), "WH");
        assert_eq!(puzzle.grid().get(0, 2).symbols_str(), "BK");

        // the givens snapshot predates the seeding
        assert_eq!(puzzle.raw_grid().get(0, 0).symbols_str(), "_");
    }

    #[test]
    fn render_is_fixed_width() {
        let puzzle = load_one(
            "( --grid -rectgrid (height 3) (width 3)
               --vertices ((data 2-WH WH BK  BK BK BK  1-WH BK 1-WH)) )",
        );
        assert_eq!(
            puzzle.render(),
            "2-WH WH   BK   \nBK   BK   BK   \n1-WH BK   1-WH \n"
        );
    }

    #[test]
    fn multiple_puzzles_in_one_file() {
        let puzzles = load_from_text(
            "( --grid -rectgrid (height 1) (width 1) ) % first
             ( --grid -rectgrid (height 2) (width 2) )",
            builtins(),
        )
        .unwrap();
        assert_eq!(puzzles.len(), 2);
        assert_eq!(puzzles[0].grid().height(), 1);
        assert_eq!(puzzles[1].grid().height(), 2);
    }

    #[test]
    fn serialize_round_trip() {
        let puzzle = load_one(
            "( --grid -rectgrid (height 3) (width 3)
               --vertices ((data 2-WH WH BK  BK BK BK  1-WH BK 1-WH))
               --rules (-nurikabe) (-notwobytwosquare (symbol BK))
               --symbols WH BK
               --editlayers (-toggle (symbols WH BK)) )",
        );

        let value = puzzle.serialize();
        let restored = Puzzle::deserialize(&value).unwrap();

        assert_eq!(restored.render(), puzzle.render());
        assert_eq!(
            restored.raw_grid().to_string(),
            puzzle.raw_grid().to_string()
        );
        assert_eq!(restored.symbols(), puzzle.symbols());

        assert_eq!(restored.rules().len(), puzzle.rules().len());
        for (a, b) in restored.rules().iter().zip(puzzle.rules()) {
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.fields(), b.fields());
        }

        assert_eq!(restored.editlayers().len(), 1);
        assert_eq!(
            restored.editlayers()[0].symbols(),
            puzzle.editlayers()[0].symbols()
        );

        // and the restored puzzle still checks identically
        assert_eq!(restored.check().passed, puzzle.check().passed);
    }

    #[test]
    fn deserialize_rejects_malformed_data() {
        let err = Puzzle::deserialize(&serde_json::json!({})).unwrap_err();
        assert!(matches!(err, Error::Interchange(_)));

        let err = Puzzle::deserialize(&serde_json::json!({
            "grid": {"type": "moebius", "height": 1, "width": 1, "vertices": []},
            "raw_grid": {"type": "rectgrid", "height": 1, "width": 1, "vertices": []},
            "symbols": [],
            "rules": [],
            "editlayers": []
        }))
        .unwrap_err();
        assert!(matches!(err, Error::UnknownGridType(ref name) if name == "moebius"));
    }

    #[test]
    fn grid_all_symbols_first_appearance_order() {
        let puzzle = load_one(
            "( --grid -rectgrid (height 1) (width 3)
               --vertices ((data 2-WH WH BK)) )",
        );
        assert_eq!(
            puzzle.grid().all_symbols(),
            vec![
                Symbol::number(2),
                Symbol::colored("WH"),
                Symbol::colored("BK")
            ]
        );
    }

    #[test]
    fn rules_describe_themselves() {
        let puzzle = load_one(
            "( --grid -rectgrid (height 1) (width 1)
               --vertices ((data WH))
               --rules (-nurikabe) )",
        );
        let listing = format!("{puzzle}");
        assert!(listing.contains("nurikabe"));
        assert!(listing.contains("WH"));
    }
}
