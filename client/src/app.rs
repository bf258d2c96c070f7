use leptos::prelude::*;

use muni_map_shared::{ClickPolicy, DEFAULT_CANVAS, MapState, Phase};

use crate::canvas::MapCanvas;
use crate::fetch;
use crate::format::format_population;

/// Shared map state, provided to every component below [`App`].
#[derive(Clone, Copy)]
pub(crate) struct MapStateStore(pub RwSignal<MapState>);

const PANEL_STYLE: &str = "position: absolute; top: 16px; right: 16px; width: 260px; padding: 14px 16px; background: #ffffff; border: 1px solid #333; border-radius: 6px; box-shadow: 0 4px 14px rgba(0,0,0,0.18); font-family: sans-serif; color: #222;";
const OVERLAY_STYLE: &str = "position: absolute; inset: 0; display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 10px; font-family: sans-serif; color: #333; pointer-events: none;";

#[component]
pub fn App() -> impl IntoView {
    let state = RwSignal::new(MapState::new(DEFAULT_CANVAS, ClickPolicy::default()));
    provide_context(MapStateStore(state));

    // Load both documents on mount; late results after unmount are dropped.
    Effect::new(move || {
        let ticket = state.with_untracked(|s| s.ticket());
        fetch::load(state, ticket);
        on_cleanup(move || {
            state.try_update(|s| s.teardown());
        });
    });

    view! {
        <div class="muni-map" style="display: inline-block; padding: 16px;">
            <h2 style="margin: 0 0 12px; font-family: sans-serif; color: #222;">
                "Mapa de atuação da ESPMA"
            </h2>
            <div style="position: relative; display: inline-block;">
                <MapCanvas />
                <StatusOverlay />
                <InfoPanel />
            </div>
        </div>
    }
}

/// Loading notice, or the failure reason with a retry button.
#[component]
fn StatusOverlay() -> impl IntoView {
    let MapStateStore(state) = expect_context();
    let phase = Memo::new(move |_| state.with(|s| s.phase()));

    let retry = move |_: web_sys::MouseEvent| {
        if let Some(ticket) = state.try_update(|s| s.retry()).flatten() {
            fetch::load(state, ticket);
        }
    };

    move || match phase.get() {
        Phase::Loading => view! {
            <div style=OVERLAY_STYLE>
                <span>"Carregando mapa..."</span>
            </div>
        }
        .into_any(),
        Phase::Failed => {
            let reason = state.with_untracked(|s| s.failure().unwrap_or_default().to_string());
            view! {
                <div style=OVERLAY_STYLE>
                    <span style="color: #a12622;">"Não foi possível carregar o mapa"</span>
                    <span style="font-size: 0.85rem; max-width: 80%; text-align: center;">{reason}</span>
                    <button style="pointer-events: auto; cursor: pointer;" on:click=retry>
                        "Tentar novamente"
                    </button>
                </div>
            }
            .into_any()
        }
        _ => ().into_any(),
    }
}

/// Details of the selected municipality. Hidden while nothing is selected.
#[component]
fn InfoPanel() -> impl IntoView {
    let MapStateStore(state) = expect_context();
    let selected = Memo::new(move |_| state.with(|s| s.selected_record().cloned()));

    move || {
        let Some(record) = selected.get() else {
            return ().into_any();
        };
        view! {
            <div class="info-panel" style=PANEL_STYLE>
                <h3 style="margin: 0 0 8px; font-size: 1.1rem;">{record.name}</h3>
                <p style="margin: 0 0 6px;">
                    <strong>"População: "</strong>
                    {format_population(record.population)}
                </p>
                <p style="margin: 0 0 12px; font-size: 0.9rem; line-height: 1.35;">{record.infos}</p>
                <button
                    style="cursor: pointer;"
                    on:click=move |_| {
                        state.update(|s| {
                            s.dismiss();
                        });
                    }
                >
                    "Fechar"
                </button>
            </div>
        }
        .into_any()
    }
}
