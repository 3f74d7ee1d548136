use std::fs;
use std::path::Path;

use eqeval::sources::{collect_vhdl_files, is_vhdl_file};
use eqeval::vhdl::{parse_entity, read_entity, Direction, Entity};
use eqeval::{evaluate, Evaluator};
use walkdir::WalkDir;

const FIXTURES: &str = "tests/fixtures";

fn fixture(name: &str) -> Entity {
    read_entity(&Path::new(FIXTURES).join(name))
        .unwrap_or_else(|e| panic!("failed to read {name}: {e}"))
        .unwrap_or_else(|| panic!("no entity in {name}"))
}

#[test]
fn every_fixture_has_an_entity_with_ports() {
    let mut count = 0;

    for entry in WalkDir::new(FIXTURES)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| is_vhdl_file(e.path()))
    {
        count += 1;
        let content = fs::read_to_string(entry.path()).unwrap();
        let entity = parse_entity(&content)
            .unwrap_or_else(|| panic!("no entity in {:?}", entry.path()));
        assert!(!entity.ports.is_empty(), "no ports in {:?}", entry.path());
    }

    assert!(count > 0, "No VHDL fixtures found in {FIXTURES}");
    assert_eq!(collect_vhdl_files(Path::new(FIXTURES)).len(), count);
}

#[test]
fn uart_generics_and_bounds() {
    let entity = fixture("uart_tx.vhd");
    assert_eq!(entity.name, "uart_tx");

    let divisor = entity.generics.iter().find(|g| g.name == "DIVISOR").unwrap();
    assert_eq!(divisor.value.as_deref(), Some("434"));

    let parity = entity.generics.iter().find(|g| g.name == "PARITY").unwrap();
    assert_eq!(parity.value.as_deref(), Some("\"none\""));

    let port = |name: &str| entity.ports.iter().find(|p| p.name == name).unwrap();
    assert_eq!(port("tx_data").left_bound(), 7);
    assert_eq!(port("tx_ready").default.as_deref(), Some("'1'"));

    let tick = port("tick_cnt");
    assert_eq!(tick.direction, Direction::Buffer);
    assert_eq!((tick.left_bound(), tick.right_bound()), (0, 433));
    assert_eq!(tick.generics, vec!["DIVISOR".to_string()]);
}

#[test]
fn uppercase_ram_declaration() {
    let entity = fixture("dual_port_ram.vhdl");
    assert_eq!(entity.name, "dual_port_ram");

    let names: Vec<_> = entity.ports.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["wr_clk", "rd_clk", "wr_addr", "wr_data", "rd_addr", "rd_data", "byte_en"]
    );

    let byte_en = entity.ports.last().unwrap();
    assert_eq!(byte_en.type_name, "STD_LOGIC_VECTOR");
    assert_eq!((byte_en.left_bound(), byte_en.right_bound()), (3, 0));

    let symbols = entity.symbols();
    assert_eq!(evaluate("WORDS*DATA_WIDTH/8", &symbols), 4096);
    assert_eq!(Evaluator::new(&symbols).try_evaluate("WORDS-1"), Ok(1023));
}
