use notice_core::{EngineCall, MemorySettingsStore, PlaybackState, PlayerConfig};
use notice_scenario_harness::ScenarioHarness;

const ASSET: &str = "/NAB_Notice.wav";

#[test]
fn idle_engine_waits_pause_interval_then_plays() {
    let mut harness = ScenarioHarness::first_boot();
    harness.engine_mut().clear_calls();

    // 15s pause at the centered pot; step every 100ms.
    harness.run_for(14_900, 100);
    assert_eq!(harness.engine().play_count(), 0);
    assert_eq!(harness.settings().bool("isPaused"), None);

    harness.run_for(200, 100);
    assert_eq!(
        harness.engine().calls(),
        &[EngineCall::PlayAsset(ASSET.into())]
    );
    assert_eq!(harness.ctx().state(), PlaybackState::Playing);
}

#[test]
fn running_engine_is_left_alone() {
    let mut harness = ScenarioHarness::first_boot();
    harness.engine_mut().set_running(true);
    harness.engine_mut().clear_calls();

    harness.run_for(60_000, 500);
    assert!(harness.engine().calls().is_empty());
    assert!(harness.engine().service_calls() > 0);
}

#[test]
fn loops_with_pause_between_playthroughs() {
    let mut harness = ScenarioHarness::first_boot();
    harness.set_pot(0);
    harness.run_for(2_100, 100);
    assert_eq!(harness.engine().play_count(), 1);

    // Clip plays for a while, then ends; the next one waits 2s again.
    harness.run_for(10_000, 100);
    assert_eq!(harness.engine().play_count(), 1);
    harness.finish_playthrough();
    harness.run_for(1_900, 100);
    assert_eq!(harness.engine().play_count(), 1);
    harness.run_for(200, 100);
    assert_eq!(harness.engine().play_count(), 2);
}

#[test]
fn clicks_alternate_state_and_resume_always_replays() {
    let mut harness = ScenarioHarness::first_boot();
    harness.engine_mut().set_running(true);

    let mut expected = PlaybackState::Playing;
    for _ in 0..6 {
        harness.engine_mut().clear_calls();
        harness.click();
        expected = match expected {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
        };
        assert_eq!(harness.ctx().state(), expected);
        assert_eq!(
            harness.settings().bool("isPaused"),
            Some(expected == PlaybackState::Paused)
        );

        match expected {
            PlaybackState::Paused => {
                assert_eq!(harness.engine().calls(), &[EngineCall::PauseResume]);
            }
            PlaybackState::Playing => {
                assert_eq!(
                    harness.engine().calls(),
                    &[EngineCall::PauseResume, EngineCall::PlayAsset(ASSET.into())]
                );
            }
        }
    }
}

#[test]
fn paused_device_issues_no_playback() {
    let mut harness = ScenarioHarness::first_boot();
    harness.click();
    assert_eq!(harness.ctx().state(), PlaybackState::Paused);
    harness.engine_mut().clear_calls();

    harness.run_for(120_000, 1_000);
    assert!(harness.engine().calls().is_empty());
}

#[test]
fn click_during_wait_is_not_lost() {
    let mut harness = ScenarioHarness::first_boot();
    harness.run_for(5_000, 100);
    assert!(harness.ctx().is_waiting());

    harness.click();
    assert_eq!(harness.ctx().state(), PlaybackState::Paused);
    assert!(!harness.ctx().is_waiting());

    // Resuming starts a play-through immediately instead of finishing the wait.
    harness.engine_mut().clear_calls();
    harness.click();
    assert_eq!(harness.engine().play_count(), 1);
}

#[test]
fn paused_then_clicked_plays_even_though_resume_was_sent() {
    let mut harness = ScenarioHarness::first_boot();
    harness.click();
    harness.engine_mut().clear_calls();

    harness.click();
    assert_eq!(harness.ctx().state(), PlaybackState::Playing);
    assert_eq!(harness.settings().bool("isPaused"), Some(false));
    let calls = harness.engine().calls();
    assert!(calls.contains(&EngineCall::PauseResume));
    assert!(calls.contains(&EngineCall::PlayAsset(ASSET.into())));
}

#[test]
fn rejected_settings_writes_keep_the_device_playing() {
    let mut settings = MemorySettingsStore::new();
    settings.set_fail_writes(true);
    let mut harness = ScenarioHarness::boot(PlayerConfig::default(), settings, 2047)
        .expect("boot should mount");
    harness.engine_mut().set_running(true);

    harness.click();
    assert_eq!(harness.ctx().state(), PlaybackState::Paused);
    harness.click();
    assert_eq!(harness.ctx().state(), PlaybackState::Playing);
    assert_eq!(harness.engine().play_count(), 1);

    harness.finish_playthrough();
    harness.run_for(15_100, 100);
    assert_eq!(harness.engine().play_count(), 2);
    assert_eq!(harness.settings().int("pause_time"), None);
    assert_eq!(harness.settings().bool("isPaused"), None);
}
