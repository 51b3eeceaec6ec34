use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use vizij_sprite_core::{
    FrameQueue, FrameRect, GridSheet, ManualClock, Player, PlayerConfig, RecordingSink,
    SpriteError,
};

fn discard(_: &FrameRect) -> Result<(), SpriteError> {
    Ok(())
}

fn bench_manual_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("player_tick");

    group.bench_function("manual_yoyo_1k_ticks", |b| {
        b.iter_batched(
            || {
                let sheet = GridSheet::new(1024, 1024, 64, 64).expect("sheet");
                let config = PlayerConfig::default()
                    .with_manual_update()
                    .with_frame_rate(30.0)
                    .with_yoyo();
                let mut player = Player::new(sheet, discard, config).expect("player");
                player.play().expect("play");
                player
            },
            |mut player| {
                for _ in 0..1_000 {
                    player.tick(Some(black_box(16.7))).expect("tick");
                }
                black_box(player.current_frame())
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("scheduled_service_1k", |b| {
        b.iter_batched(
            || {
                let queue = FrameQueue::new();
                let clock = ManualClock::new();
                let frames: Vec<u32> = (0..64).collect();
                let mut player = Player::with_runtime(
                    frames,
                    RecordingSink::new(),
                    PlayerConfig::default().with_loop(),
                    queue,
                    clock.clone(),
                )
                .expect("player");
                player.play().expect("play");
                (player, clock)
            },
            |(mut player, clock)| {
                for _ in 0..1_000 {
                    clock.advance(8.0);
                    player.service_frame().expect("service");
                }
                black_box(player.sink().render_count())
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_manual_tick);
criterion_main!(benches);
