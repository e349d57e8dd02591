use chrono::{DateTime, NaiveDate};
use leptos::prelude::*;
use leptos::server_fn::error::NoCustomError;

use crate::data::booking::{BookingChange, BookingConfig, BookingSummary};
use crate::data::form::{BookingForm, FormPhase};
use crate::pages::booking::{get_booking_config, get_room_day};
use crate::pages::server_error_message;
use crate::pages::slot_grid::SlotGrid;

#[server(SaveBookingChanges)]
pub async fn save_booking_changes(
    booking_id: i64,
    change: BookingChange,
) -> Result<(), ServerFnError> {
    use crate::data::api::PlekApi;
    use crate::settings::Settings;

    let settings = Settings::from_yaml("settings.yaml")
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    PlekApi::new(&settings)
        .update_booking(booking_id, &change)
        .await
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
}

#[server(CancelBooking)]
pub async fn cancel_booking(booking_id: i64) -> Result<(), ServerFnError> {
    use crate::data::api::PlekApi;
    use crate::settings::Settings;

    let settings = Settings::from_yaml("settings.yaml")
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    PlekApi::new(&settings)
        .cancel_booking(booking_id)
        .await
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
}

/// Modal for changing or cancelling one of the user's bookings. Same slot
/// picking as the create flow, except the booking being edited never counts
/// as a conflict against itself.
#[component]
pub fn ModifyBooking(
    booking: BookingSummary,
    on_close: Callback<()>,
    on_done: Callback<()>,
) -> impl IntoView {
    let booking_id = booking.id;
    let room_id = booking.room.id;
    let room_name = booking.room.name.clone();

    let defaults = BookingConfig::default();
    let initial_date = DateTime::parse_from_rfc3339(&booking.start_time)
        .map(|start| start.with_timezone(&defaults.zone()).date_naive())
        .unwrap_or_else(|_| defaults.today());
    let form = RwSignal::new(BookingForm::for_modification(
        defaults.calendar(),
        defaults.zone(),
        initial_date,
        booking_id,
    ));

    let (date_input, set_date_input) =
        create_signal(initial_date.format("%Y-%m-%d").to_string());
    let (purpose_input, set_purpose_input) = create_signal(booking.purpose.clone());
    let (participants_input, set_participants_input) =
        create_signal(booking.participants.clone());
    let (notes_input, set_notes_input) = create_signal(booking.notes.clone());
    let (form_error, set_form_error) = create_signal::<Option<String>>(None);

    // Cancelling is destructive: the first click arms, the second confirms.
    let (cancel_armed, set_cancel_armed) = create_signal(false);
    let (is_cancelling, set_is_cancelling) = create_signal(false);

    let fetch_slots = move |date: NaiveDate| {
        let mut token = 0;
        form.update(|f| token = f.begin_fetch(date));

        let date_text = date.format("%Y-%m-%d").to_string();
        leptos::task::spawn_local(async move {
            match get_room_day(room_id, date_text).await {
                Ok(bookings) => {
                    form.update(|f| {
                        f.resolve_fetch(token, bookings);
                    });
                }
                Err(err) => {
                    leptos::logging::log!("Error fetching room bookings: {:?}", err);
                    form.update(|f| {
                        f.resolve_fetch_error(token);
                    });
                }
            }
        });
    };

    #[cfg(not(feature = "ssr"))]
    leptos::task::spawn_local(async move {
        match get_booking_config().await {
            Ok(config) => {
                form.update(|f| f.reconfigure(config.calendar(), config.zone()));
            }
            Err(err) => {
                leptos::logging::log!("Error fetching booking config: {:?}", err);
            }
        }
        // The user may have picked another date while the config round trip
        // was in flight; fetch whatever the form points at now.
        fetch_slots(form.with_untracked(|f| f.date()));
    });

    let handle_date_change = move |ev| {
        let value = event_target_value(&ev);
        set_date_input.set(value.clone());
        if let Ok(date) = NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
            fetch_slots(date);
        }
    };

    let handle_save = move |_| {
        set_form_error.set(None);

        let purpose = purpose_input.get().trim().to_string();
        if purpose.is_empty() {
            set_form_error.set(Some("Please enter a purpose for the booking".to_string()));
            return;
        }

        let mut outcome = None;
        form.update(|f| outcome = Some(f.begin_submit()));
        match outcome {
            Some(Ok(interval)) => {
                let change = BookingChange {
                    start_time: interval.start_time,
                    end_time: interval.end_time,
                    purpose,
                    participants: participants_input.get().trim().to_string(),
                    notes: notes_input.get().trim().to_string(),
                };
                leptos::task::spawn_local(async move {
                    match save_booking_changes(booking_id, change).await {
                        Ok(()) => form.update(|f| f.resolve_submit()),
                        Err(err) => {
                            let message = server_error_message(&err);
                            form.update(|f| f.resolve_submit_error(message));
                        }
                    }
                });
            }
            Some(Err(err)) => set_form_error.set(Some(err.to_string())),
            None => {}
        }
    };

    let handle_cancel_booking = move |_| {
        if !cancel_armed.get() {
            set_cancel_armed.set(true);
            return;
        }
        set_is_cancelling.set(true);
        leptos::task::spawn_local(async move {
            match cancel_booking(booking_id).await {
                Ok(()) => on_done.run(()),
                Err(err) => {
                    set_is_cancelling.set(false);
                    set_cancel_armed.set(false);
                    set_form_error.set(Some(server_error_message(&err)));
                }
            }
        });
    };

    let error_text = move || {
        if let Some(message) = form_error.get() {
            return Some(message);
        }
        let current = form.get();
        match current.phase() {
            FormPhase::SubmitError(message) => Some(message.clone()),
            _ => None,
        }
    };

    view! {
        <div class="fixed inset-0 bg-black bg-opacity-50 flex items-center justify-center z-50 p-4">
            <div class="bg-white rounded-lg shadow-xl w-full max-w-2xl max-h-[90vh] overflow-y-auto p-6">
                {move || {
                    if *form.get().phase() == FormPhase::Success {
                        view! {
                            <div class="text-center py-8">
                                <h3 class="text-xl font-semibold text-gray-800">"Booking updated"</h3>
                                <button
                                    class="mt-6 px-4 py-2 bg-purple-600 text-white rounded-md hover:bg-purple-700"
                                    on:click=move |_| on_done.run(())
                                >
                                    "Done"
                                </button>
                            </div>
                        }
                        .into_any()
                    } else {
                        view! {
                            <div>
                                <div class="flex justify-between items-start mb-4">
                                    <h3 class="text-xl font-semibold text-gray-800">
                                        {format!("Modify booking - {}", room_name.clone())}
                                    </h3>
                                    <button
                                        class="text-gray-400 hover:text-gray-600 text-2xl leading-none"
                                        on:click=move |_| on_close.run(())
                                    >
                                        "\u{00d7}"
                                    </button>
                                </div>

                                <div class="mb-4">
                                    <label class="text-sm font-medium text-gray-700 mb-1 block">"Date:"</label>
                                    <input
                                        type="date"
                                        class="px-3 py-2 border border-gray-300 rounded-md"
                                        prop:value={date_input}
                                        on:input=handle_date_change
                                    />
                                </div>

                                <div class="mb-4">
                                    <label class="text-sm font-medium text-gray-700 mb-1 block">
                                        "Time slots (pick a continuous block):"
                                    </label>
                                    <SlotGrid form=form/>
                                </div>

                                <div class="mb-4 flex flex-col">
                                    <label class="text-sm font-medium text-gray-700 mb-1">"Purpose:"</label>
                                    <input
                                        type="text"
                                        class="px-3 py-2 border border-gray-300 rounded-md"
                                        prop:value={purpose_input}
                                        on:input=move |ev| set_purpose_input.set(event_target_value(&ev))
                                    />
                                </div>

                                <div class="mb-4 flex flex-col">
                                    <label class="text-sm font-medium text-gray-700 mb-1">"Participants:"</label>
                                    <input
                                        type="text"
                                        class="px-3 py-2 border border-gray-300 rounded-md"
                                        prop:value={participants_input}
                                        on:input=move |ev| set_participants_input.set(event_target_value(&ev))
                                    />
                                </div>

                                <div class="mb-4 flex flex-col">
                                    <label class="text-sm font-medium text-gray-700 mb-1">"Notes:"</label>
                                    <textarea
                                        class="px-3 py-2 border border-gray-300 rounded-md"
                                        rows="2"
                                        prop:value={notes_input}
                                        on:input=move |ev| set_notes_input.set(event_target_value(&ev))
                                    ></textarea>
                                </div>

                                {move || match error_text() {
                                    Some(message) => view! {
                                        <div class="text-sm mb-4 text-amber-600">{message}</div>
                                    }
                                    .into_any(),
                                    None => view! { <div class="hidden"></div> }.into_any(),
                                }}

                                <div class="flex justify-between items-center">
                                    <button
                                        class="px-4 py-2 bg-red-600 text-white rounded-md hover:bg-red-700 disabled:opacity-50"
                                        disabled=move || is_cancelling.get()
                                        on:click=handle_cancel_booking
                                    >
                                        {move || {
                                            if is_cancelling.get() {
                                                "Cancelling..."
                                            } else if cancel_armed.get() {
                                                "Click again to confirm"
                                            } else {
                                                "Cancel booking"
                                            }
                                        }}
                                    </button>
                                    <div class="flex gap-2">
                                        <button
                                            class="px-4 py-2 border border-gray-300 text-gray-700 rounded-md hover:bg-gray-50"
                                            on:click=move |_| on_close.run(())
                                        >
                                            "Close"
                                        </button>
                                        <button
                                            class="px-4 py-2 bg-purple-600 text-white rounded-md hover:bg-purple-700 disabled:opacity-50"
                                            disabled=move || form.get().is_submitting()
                                            on:click=handle_save
                                        >
                                            {move || if form.get().is_submitting() { "Saving..." } else { "Save changes" }}
                                        </button>
                                    </div>
                                </div>
                            </div>
                        }
                        .into_any()
                    }
                }}
            </div>
        </div>
    }
}
