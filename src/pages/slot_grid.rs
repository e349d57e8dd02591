use leptos::prelude::*;

use crate::data::form::{BookingForm, FormPhase};

/// The day's slot buttons. Booked slots are disabled, selected slots
/// highlighted; all selection rules live in [`BookingForm`].
#[component]
pub fn SlotGrid(form: RwSignal<BookingForm>) -> impl IntoView {
    view! {
        <div>
            {move || {
                let current = form.get();
                let waiting =
                    current.is_loading() || *current.phase() == FormPhase::Idle;
                if waiting {
                    view! {
                        <div class="text-sm text-gray-400 py-4">"Checking availability..."</div>
                    }
                    .into_any()
                } else {
                    view! {
                        <div class="grid grid-cols-2 md:grid-cols-4 gap-2">
                            {current
                                .statuses()
                                .iter()
                                .enumerate()
                                .map(|(index, status)| {
                                    let label = status.slot.label();
                                    let is_booked = status.is_booked;
                                    let is_selected = current.selection().contains(&status.slot);
                                    let class = if is_booked {
                                        "px-3 py-2 rounded-lg text-sm bg-gray-700 text-gray-500 line-through cursor-not-allowed"
                                    } else if is_selected {
                                        "px-3 py-2 rounded-lg text-sm bg-purple-600 text-white"
                                    } else {
                                        "px-3 py-2 rounded-lg text-sm bg-gray-600 text-gray-200 hover:bg-gray-500"
                                    };
                                    view! {
                                        <button
                                            type="button"
                                            class=class
                                            disabled=is_booked
                                            on:click=move |_| form.update(|f| f.toggle_slot(index))
                                        >
                                            {label}
                                        </button>
                                    }
                                })
                                .collect::<Vec<_>>()}
                        </div>
                    }
                    .into_any()
                }
            }}
            {move || {
                if form.get().fetch_failed() {
                    view! {
                        <div class="mt-2 text-sm text-amber-600">
                            "Couldn't load existing bookings for this date. All slots are shown as free."
                        </div>
                    }
                    .into_any()
                } else {
                    view! { <div class="hidden"></div> }.into_any()
                }
            }}
        </div>
    }
}
