use chrono::NaiveDate;
use leptos::prelude::*;

use crate::data::booking::{BookingConfig, BookingDraft, Room};
use crate::data::form::{BookingForm, FormPhase};
use crate::pages::booking::{get_booking_config, get_room_day, submit_booking};
use crate::pages::server_error_message;
use crate::pages::slot_grid::SlotGrid;

/// Modal for booking a room: pick a date, pick a contiguous run of slots,
/// fill in the details, submit. Slot and phase rules live in [`BookingForm`];
/// this component only wires signals and network calls to it.
#[component]
pub fn ConfirmBooking(room: Room, on_close: Callback<()>) -> impl IntoView {
    let room_id = room.id;
    let capacity = room.capacity;
    let room_name = room.name.clone();
    let building = room
        .building_name
        .clone()
        .unwrap_or_else(|| "Unknown building".to_string());

    // Defaults until the policy configuration arrives from the server.
    let defaults = BookingConfig::default();
    let today = defaults.today();
    let form = RwSignal::new(BookingForm::new(defaults.calendar(), defaults.zone(), today));

    let today_text = today.format("%Y-%m-%d").to_string();
    let (date_input, set_date_input) = create_signal(today_text.clone());

    let (purpose_input, set_purpose_input) = create_signal(String::new());
    let (participants_input, set_participants_input) = create_signal(String::new());
    let (attendees_input, set_attendees_input) = create_signal(String::new());
    let (notes_input, set_notes_input) = create_signal(String::new());
    let (form_error, set_form_error) = create_signal::<Option<String>>(None);

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

    let handle_submit = move |_| {
        set_form_error.set(None);

        let purpose = purpose_input.get().trim().to_string();
        if purpose.is_empty() {
            set_form_error.set(Some("Please enter a purpose for the booking".to_string()));
            return;
        }
        let attendees = match attendees_input.get().trim().parse::<u32>() {
            Ok(count) if count > 0 => count,
            _ => {
                set_form_error.set(Some("Please enter the number of attendees".to_string()));
                return;
            }
        };
        if attendees > capacity {
            set_form_error.set(Some(format!(
                "This room seats {} people at most",
                capacity
            )));
            return;
        }

        let mut outcome = None;
        form.update(|f| outcome = Some(f.begin_submit()));
        match outcome {
            Some(Ok(interval)) => {
                let draft = BookingDraft::pending(
                    room_id,
                    interval,
                    purpose,
                    participants_input.get().trim().to_string(),
                    attendees,
                    notes_input.get().trim().to_string(),
                );
                leptos::task::spawn_local(async move {
                    match submit_booking(draft).await {
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
                                <h3 class="text-xl font-semibold text-gray-800">"Booking request submitted"</h3>
                                <p class="text-sm text-gray-500 mt-2">
                                    {format!("Your request for {} is pending approval.", room_name.clone())}
                                </p>
                                <button
                                    class="mt-6 px-4 py-2 bg-purple-600 text-white rounded-md hover:bg-purple-700"
                                    on:click=move |_| on_close.run(())
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
                                    <div>
                                        <h3 class="text-xl font-semibold text-gray-800">{room_name.clone()}</h3>
                                        <p class="text-sm text-gray-500">
                                            {format!("{} - {} seats", building.clone(), capacity)}
                                        </p>
                                    </div>
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
                                        min=today_text.clone()
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

                                <div class="grid grid-cols-1 md:grid-cols-2 gap-4 mb-4">
                                    <div class="flex flex-col">
                                        <label class="text-sm font-medium text-gray-700 mb-1">"Purpose:"</label>
                                        <input
                                            type="text"
                                            class="px-3 py-2 border border-gray-300 rounded-md"
                                            placeholder="e.g., Team meeting"
                                            prop:value={purpose_input}
                                            on:input=move |ev| set_purpose_input.set(event_target_value(&ev))
                                        />
                                    </div>
                                    <div class="flex flex-col">
                                        <label class="text-sm font-medium text-gray-700 mb-1">"Attendees:"</label>
                                        <input
                                            type="number"
                                            class="px-3 py-2 border border-gray-300 rounded-md"
                                            min="1"
                                            prop:value={attendees_input}
                                            on:input=move |ev| set_attendees_input.set(event_target_value(&ev))
                                        />
                                    </div>
                                </div>

                                <div class="mb-4 flex flex-col">
                                    <label class="text-sm font-medium text-gray-700 mb-1">"Participants:"</label>
                                    <input
                                        type="text"
                                        class="px-3 py-2 border border-gray-300 rounded-md"
                                        placeholder="Who is attending (optional)"
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

                                <div class="flex justify-end gap-2">
                                    <button
                                        class="px-4 py-2 border border-gray-300 text-gray-700 rounded-md hover:bg-gray-50"
                                        on:click=move |_| on_close.run(())
                                    >
                                        "Cancel"
                                    </button>
                                    <button
                                        class="px-4 py-2 bg-purple-600 text-white rounded-md hover:bg-purple-700 disabled:opacity-50"
                                        disabled=move || form.get().is_submitting()
                                        on:click=handle_submit
                                    >
                                        {move || if form.get().is_submitting() { "Submitting..." } else { "Request booking" }}
                                    </button>
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
