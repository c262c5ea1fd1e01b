use criterion::{criterion_group, criterion_main, Criterion};
use hive_koth::board::Board;
use hive_koth::hex::Hex;
use hive_koth::piece::{Color, Piece, Species};
use hive_koth::rules;

fn mid_game() -> Board {
    let mut board = Board::new();
    let mut id = 0u32;
    let mut put = |board: &mut Board, q, r, species, color| {
        id += 1;
        board.push(Hex::new(q, r), Piece { id, species, color });
    };
    put(&mut board, 0, 0, Species::Queen, Color::White);
    put(&mut board, 1, 0, Species::Queen, Color::Black);
    put(&mut board, 0, -1, Species::Ant, Color::White);
    put(&mut board, 1, -1, Species::Ant, Color::Black);
    put(&mut board, -1, 1, Species::Spider, Color::White);
    put(&mut board, 2, -1, Species::Grasshopper, Color::Black);
    board
}

fn high_density_game() -> Board {
    let mut board = Board::new();
    let mut id = 0u32;
    let mut put = |board: &mut Board, q, r, species, color| {
        id += 1;
        board.push(Hex::new(q, r), Piece { id, species, color });
    };
    put(&mut board, 0, 0, Species::Queen, Color::White);
    put(&mut board, 1, 0, Species::Queen, Color::Black);
    put(&mut board, -1, 0, Species::Ant, Color::White);
    put(&mut board, 2, 0, Species::Ant, Color::Black);
    put(&mut board, -1, 1, Species::Spider, Color::White);
    put(&mut board, 2, -1, Species::Spider, Color::Black);
    put(&mut board, 0, -1, Species::Grasshopper, Color::White);
    put(&mut board, 1, 1, Species::Grasshopper, Color::Black);
    put(&mut board, -2, 1, Species::Beetle, Color::White);
    put(&mut board, 3, -1, Species::Beetle, Color::Black);
    board
}

fn beetle_stack_game() -> Board {
    let mut board = Board::new();
    let mut id = 0u32;
    let mut put = |board: &mut Board, q, r, species, color| {
        id += 1;
        board.push(Hex::new(q, r), Piece { id, species, color });
    };
    put(&mut board, 0, 0, Species::Queen, Color::White);
    put(&mut board, 1, 0, Species::Queen, Color::Black);
    put(&mut board, 0, 0, Species::Beetle, Color::Black);
    put(&mut board, 1, 0, Species::Beetle, Color::White);
    put(&mut board, 0, 0, Species::Beetle, Color::White);
    board
}

fn bench_generate_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_moves");

    let games = [
        ("mid", mid_game()),
        ("high_density", high_density_game()),
        ("beetle_stack", beetle_stack_game()),
    ];

    for (name, board) in &games {
        group.bench_with_input(format!("piece_moves {name}"), board, |b, board| {
            b.iter(|| {
                for hex in board.occupied_coords() {
                    rules::piece_moves(board, hex);
                }
            })
        });
        group.bench_with_input(format!("valid_placements {name}"), board, |b, board| {
            b.iter(|| rules::valid_placements(board, Color::White))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate_moves);
criterion_main!(benches);
