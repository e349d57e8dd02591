use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{
    components::{FlatRoutes, Route, Router},
    StaticSegment,
};

use crate::pages::booking::BookingPage;
use crate::pages::my_bookings::MyBookingsPage;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <Stylesheet id="leptos" href="/pkg/plek-web.css"/>
                <AutoReload options=options.clone() />
                <HydrationScripts options/>
                <link rel="shortcut icon" type="image/ico" href="/favicon.ico"/>
                <Link rel="preconnect" href="https://fonts.googleapis.com"/>
                <Link rel="preconnect" href="https://fonts.gstatic.com" crossorigin="anonymous"/>
                <Link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap" rel="stylesheet"/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Router>
            <nav class="border-b border-gray-800 px-6 py-4 bg-gray-900 text-white">
                <div class="flex items-center space-x-8">
                    <span class="text-xl font-semibold">"Plek"</span>
                    <div class="flex space-x-6">
                        <a href="/" class="text-gray-400 hover:text-gray-300">"Book a room"</a>
                        <a href="/my-bookings" class="text-gray-400 hover:text-gray-300">"My bookings"</a>
                    </div>
                </div>
            </nav>
            <FlatRoutes fallback=|| "Page not found.">
                <Route path=StaticSegment("") view=BookingPage/>
                <Route path=StaticSegment("my-bookings") view=MyBookingsPage/>
            </FlatRoutes>
        </Router>
    }
}
