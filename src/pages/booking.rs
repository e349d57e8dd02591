use leptos::prelude::*;
use leptos::server_fn::error::NoCustomError;

use crate::data::booking::{BookingConfig, BookingDraft, ExistingBooking, Room};
use crate::pages::confirm_booking::ConfirmBooking;
use crate::pages::server_error_message;

#[server(GetBookingConfig)]
pub async fn get_booking_config() -> Result<BookingConfig, ServerFnError> {
    use crate::settings::Settings;

    let settings = Settings::from_yaml("settings.yaml")
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
    Ok(settings.booking_config())
}

#[server(GetRooms)]
pub async fn get_rooms() -> Result<Vec<Room>, ServerFnError> {
    use crate::data::api::PlekApi;
    use crate::settings::Settings;

    let settings = Settings::from_yaml("settings.yaml")
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    PlekApi::new(&settings)
        .rooms()
        .await
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
}

/// The bookings already on a room for one civil date. The date is validated
/// here so a malformed query never reaches the backend.
#[server(GetRoomDay)]
pub async fn get_room_day(
    room_id: i64,
    date: String,
) -> Result<Vec<ExistingBooking>, ServerFnError> {
    use crate::data::api::PlekApi;
    use crate::settings::Settings;

    let date = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    let settings = Settings::from_yaml("settings.yaml")
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    let day = PlekApi::new(&settings)
        .room_day(room_id, date)
        .await
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;
    Ok(day.bookings)
}

#[server(SubmitBooking)]
pub async fn submit_booking(draft: BookingDraft) -> Result<(), ServerFnError> {
    use crate::data::api::PlekApi;
    use crate::settings::Settings;

    let settings = Settings::from_yaml("settings.yaml")
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    PlekApi::new(&settings)
        .create_booking(&draft)
        .await
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
}

#[component]
pub fn BookingPage() -> impl IntoView {
    let (rooms, set_rooms) = create_signal(Vec::<Room>::new());
    let (search_input, set_search_input) = create_signal(String::new());
    let (is_loading, set_is_loading) = create_signal(true);
    let (load_error, set_load_error) = create_signal::<Option<String>>(None);
    let (selected_room, set_selected_room) = create_signal::<Option<Room>>(None);

    #[cfg(not(feature = "ssr"))]
    leptos::task::spawn_local(async move {
        match get_rooms().await {
            Ok(data) => set_rooms.set(data),
            Err(err) => {
                leptos::logging::log!("Error fetching rooms: {:?}", err);
                set_load_error.set(Some(server_error_message(&err)));
            }
        }
        set_is_loading.set(false);
    });

    let filtered_rooms = create_memo(move |_| {
        let query = search_input.get().to_lowercase();
        rooms
            .get()
            .into_iter()
            .filter(|room| {
                query.is_empty()
                    || room.name.to_lowercase().contains(&query)
                    || room
                        .building_name
                        .as_deref()
                        .is_some_and(|building| building.to_lowercase().contains(&query))
            })
            .collect::<Vec<_>>()
    });

    view! {
        <div class="max-w-5xl mx-auto p-4">
            <div class="flex justify-between items-center mb-6">
                <h2 class="text-2xl font-bold text-gray-800">"Book a room"</h2>
            </div>

            <div class="mb-6">
                <input
                    type="text"
                    class="w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-purple-500"
                    placeholder="Search by room or building name"
                    prop:value={search_input}
                    on:input=move |ev| set_search_input.set(event_target_value(&ev))
                />
            </div>

            {move || match load_error.get() {
                Some(message) => view! {
                    <div class="text-sm mt-2 text-amber-600">{message}</div>
                }
                .into_any(),
                None => view! { <div class="hidden"></div> }.into_any(),
            }}

            {move || {
                if is_loading.get() {
                    view! {
                        <div class="text-sm text-gray-500 py-8">"Loading rooms..."</div>
                    }
                    .into_any()
                } else {
                    view! {
                        <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">
                            {filtered_rooms
                                .get()
                                .into_iter()
                                .map(|room| {
                                    let card = room.clone();
                                    view! {
                                        <div class="border border-gray-200 rounded-lg p-4 shadow-sm hover:shadow-md transition-shadow">
                                            <div class="flex justify-between items-start">
                                                <h3 class="text-lg font-semibold text-gray-800">{room.name.clone()}</h3>
                                                <span class="text-sm text-gray-500">{format!("{} seats", room.capacity)}</span>
                                            </div>
                                            <p class="text-sm text-gray-500 mt-1">
                                                {room.building_name.clone().unwrap_or_else(|| "Unknown building".to_string())}
                                            </p>
                                            <p class="text-xs text-gray-400 mt-2">{room.amenities.join(", ")}</p>
                                            <button
                                                class="mt-4 w-full px-4 py-2 bg-purple-600 text-white rounded-md hover:bg-purple-700 transition-colors"
                                                on:click=move |_| set_selected_room.set(Some(card.clone()))
                                            >
                                                "Book"
                                            </button>
                                        </div>
                                    }
                                })
                                .collect::<Vec<_>>()}
                        </div>
                    }
                    .into_any()
                }
            }}

            {move || match selected_room.get() {
                Some(room) => view! {
                    <ConfirmBooking
                        room=room
                        on_close=Callback::new(move |_| set_selected_room.set(None))
                    />
                }
                .into_any(),
                None => view! { <div class="hidden"></div> }.into_any(),
            }}
        </div>
    }
}
